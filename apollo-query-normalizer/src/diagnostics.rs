//! Diagnostics emitted while normalizing.
//!
//! Normalization never logs by itself: it reports what it did to the [`DiagnosticSink`] given to the
//! [`Normalizer`](crate::Normalizer). [`NoopDiagnostics`] is the default sink, and
//! [`TracingDiagnostics`] forwards everything to `tracing`.
use std::fmt;

use apollo_compiler::Name;

use crate::alias_map::StructuralPath;

/// Something worth reporting about one normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// A repeated field was given a canonical alias.
    FieldAliased {
        path: StructuralPath,
        field: Name,
        alias: Name,
    },
    /// A variable was renamed after the argument it is bound to.
    VariableRenamed { from: Name, to: Name },
    /// A variable is referenced somewhere that is not an argument or input object field, so it kept
    /// its name.
    UnregisteredVariable { name: Name },
    /// A variable that kept its name ends up with the same name as a renamed variable.
    VariableNameCollision { name: Name },
    /// An anonymous operation was named.
    OperationNamed { name: Name },
    /// An anonymous operation could not be named because the document selects no field.
    OperationNameUnavailable,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FieldAliased { path, field, alias } => {
                write!(f, "field '{field}' at '{path}' aliased to '{alias}'")
            }
            Diagnostic::VariableRenamed { from, to } => {
                write!(f, "variable '${from}' renamed to '${to}'")
            }
            Diagnostic::UnregisteredVariable { name } => {
                write!(f, "variable '${name}' is not bound to an argument and keeps its name")
            }
            Diagnostic::VariableNameCollision { name } => {
                write!(f, "variable '${name}' collides with a canonical variable name")
            }
            Diagnostic::OperationNamed { name } => write!(f, "anonymous operation named '{name}'"),
            Diagnostic::OperationNameUnavailable => {
                write!(f, "anonymous operation left unnamed: no field found")
            }
        }
    }
}

/// Receives [`Diagnostic`]s.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl DiagnosticSink for NoopDiagnostics {
    fn emit(&self, _diagnostic: Diagnostic) {}
}

/// Forwards diagnostics to `tracing`: renames at `trace` level, names that could not be
/// canonicalized at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnregisteredVariable { .. }
            | Diagnostic::VariableNameCollision { .. }
            | Diagnostic::OperationNameUnavailable => {
                tracing::warn!(%diagnostic, "query normalization")
            }
            _ => tracing::trace!(%diagnostic, "query normalization"),
        }
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(Diagnostic) + Send + Sync,
{
    fn emit(&self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Mutex;

    use super::*;

    /// Collects diagnostics so tests can assert on them.
    #[derive(Default)]
    pub(crate) struct CollectDiagnostics(Mutex<Vec<Diagnostic>>);

    impl CollectDiagnostics {
        pub(crate) fn take(&self) -> Vec<Diagnostic> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl DiagnosticSink for CollectDiagnostics {
        fn emit(&self, diagnostic: Diagnostic) {
            self.0.lock().unwrap().push(diagnostic);
        }
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |diagnostic: Diagnostic| seen.lock().unwrap().push(diagnostic.to_string());
        sink.emit(Diagnostic::OperationNameUnavailable);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["anonymous operation left unnamed: no field found".to_string()]
        );
    }
}
