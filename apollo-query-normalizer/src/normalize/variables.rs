//! Variable-name normalization.
//!
//! A variable is renamed after the argument (or input object field) it is bound to. The first variable
//! bound to an argument name takes that name, the next distinct variables bound to the same name take
//! `name1`, `name2` and so on, in document order. The variable values are relabeled to match.
use std::collections::HashMap;
use std::ops::ControlFlow;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use indexmap::IndexSet;
use serde_json_bytes::ByteString;

use super::traverse;
use super::traverse::Visitor;
use super::traverse::transform;
use super::traverse::transform::Rewritten;
use super::traverse::transform::Transform;
use crate::alias_map::ArgNameMap;
use crate::configuration::UnregisteredVariables;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticSink;
use crate::error::NormalizeError;
use crate::json_ext::Object;

/// Rename every variable bound to an argument and relabel `variables` accordingly.
///
/// Variables referenced anywhere else (inside a list literal, for instance) are handled according to
/// `unregistered`.
pub fn normalize_variable_names(
    document: &ast::Document,
    variables: Option<Object>,
    unregistered: UnregisteredVariables,
    diagnostics: &dyn DiagnosticSink,
) -> Result<(ast::Document, Option<Object>, ArgNameMap), NormalizeError> {
    let mut registry = Registry {
        canonical_names: HashMap::new(),
        claims: HashMap::new(),
        arg_name_map: ArgNameMap::default(),
        diagnostics,
    };
    if let ControlFlow::Break(error) = traverse::document(&mut registry, document) {
        return Err(error);
    }

    let mut rename = Rename {
        canonical_names: &registry.canonical_names,
        unregistered: IndexSet::new(),
    };
    let document = transform::document(&mut rename, document)?;

    if let (UnregisteredVariables::Reject, Some(name)) = (unregistered, rename.unregistered.first()) {
        return Err(NormalizeError::UnregisteredVariable(name.to_string()));
    }
    for name in &rename.unregistered {
        diagnostics.emit(Diagnostic::UnregisteredVariable { name: name.clone() });
        if registry.arg_name_map.contains(name.as_str()) {
            diagnostics.emit(Diagnostic::VariableNameCollision { name: name.clone() });
        }
    }

    let variables = variables.map(|variables| relabel(&registry.canonical_names, variables));
    Ok((document, variables, registry.arg_name_map))
}

/// Assigns canonical names at binding sites.
struct Registry<'a> {
    /// Original variable name to canonical name. Fixed at the first binding site.
    canonical_names: HashMap<Name, Name>,
    /// How many distinct variables claimed each argument name.
    claims: HashMap<Name, usize>,
    arg_name_map: ArgNameMap,
    diagnostics: &'a dyn DiagnosticSink,
}

impl Registry<'_> {
    fn bind(&mut self, argument: &Name, value: &ast::Value) -> ControlFlow<NormalizeError> {
        if let ast::Value::Variable(variable) = value {
            if let Err(error) = self.register(variable, argument) {
                return ControlFlow::Break(error);
            }
        }
        ControlFlow::Continue(())
    }

    fn register(&mut self, variable: &Name, argument: &Name) -> Result<(), NormalizeError> {
        if self.canonical_names.contains_key(variable) {
            return Ok(());
        }

        let claims = self.claims.entry(argument.clone()).or_default();
        let canonical = loop {
            let candidate = if *claims == 0 {
                argument.clone()
            } else {
                Name::new(&format!("{argument}{claims}"))?
            };
            *claims += 1;
            // `name1` may already be taken by a variable bound to an argument called `name1`
            if !self.arg_name_map.contains(candidate.as_str()) {
                break candidate;
            }
        };

        if canonical != *variable {
            self.diagnostics.emit(Diagnostic::VariableRenamed {
                from: variable.clone(),
                to: canonical.clone(),
            });
        }
        self.arg_name_map.insert(canonical.clone(), argument.clone());
        self.canonical_names.insert(variable.clone(), canonical);
        Ok(())
    }
}

impl Visitor for Registry<'_> {
    type Break = NormalizeError;

    fn argument(&mut self, def: &ast::Argument) -> ControlFlow<NormalizeError> {
        self.bind(&def.name, &def.value)?;
        traverse::input_value(self, &def.value)
    }

    fn object_field(&mut self, name: &Name, value: &ast::Value) -> ControlFlow<NormalizeError> {
        self.bind(name, value)?;
        traverse::input_value(self, value)
    }
}

/// Rewrites references and definitions through the registered names.
struct Rename<'a> {
    canonical_names: &'a HashMap<Name, Name>,
    /// Referenced variables with no binding site, in document order.
    unregistered: IndexSet<Name>,
}

impl Rename<'_> {
    fn canonical(&self, name: &Name) -> Option<Name> {
        self.canonical_names
            .get(name)
            .filter(|canonical| *canonical != name)
            .cloned()
    }
}

impl Transform for Rename<'_> {
    fn variable_definition(
        &mut self,
        def: &Node<ast::VariableDefinition>,
    ) -> Rewritten<Node<ast::VariableDefinition>> {
        Ok(self.canonical(&def.name).map(|name| {
            let mut def = def.clone();
            def.make_mut().name = name;
            def
        }))
    }

    fn variable(&mut self, name: &Name) -> Rewritten<Name> {
        if !self.canonical_names.contains_key(name) {
            self.unregistered.insert(name.clone());
        }
        Ok(self.canonical(name))
    }
}

/// Relabel variable values with their canonical names.
///
/// Keys with no canonical name are kept as they are, unless a canonical name already took their place.
fn relabel(canonical_names: &HashMap<Name, Name>, variables: Object) -> Object {
    let mut relabeled = Object::new();
    for (key, value) in variables {
        match canonical_names.get(key.as_str()) {
            Some(canonical) => {
                relabeled.insert(ByteString::from(canonical.as_str()), value);
            }
            None => {
                if !relabeled.contains_key(key.as_str()) {
                    relabeled.insert(key, value);
                }
            }
        }
    }
    relabeled
}
