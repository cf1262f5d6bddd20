//! Operation-name backfilling.
use std::ops::ControlFlow;

use apollo_compiler::Name;
use apollo_compiler::ast;

use super::traverse;
use super::traverse::Visitor;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticSink;

/// Name the first operation of a document where no operation is named.
///
/// The name is the one of the first field found in document order, which may belong to a fragment
/// defined before the operation.
pub fn fill_operation_name(
    document: &ast::Document,
    diagnostics: &dyn DiagnosticSink,
) -> ast::Document {
    name_operation(document, fallback_name(document), diagnostics)
}

/// The name of the first field of `document`, in document order.
pub(crate) fn fallback_name(document: &ast::Document) -> Option<Name> {
    match traverse::document(&mut FirstField, document) {
        ControlFlow::Break(name) => Some(name),
        ControlFlow::Continue(()) => None,
    }
}

/// Give the first operation the `fallback` name, unless some operation is already named.
pub(crate) fn name_operation(
    document: &ast::Document,
    fallback: Option<Name>,
    diagnostics: &dyn DiagnosticSink,
) -> ast::Document {
    let mut document = document.clone();
    let mut operations = document.definitions.iter().filter_map(|def| match def {
        ast::Definition::OperationDefinition(def) => Some(def),
        _ => None,
    });
    if operations.any(|def| def.name.is_some()) {
        return document;
    }

    let Some(name) = fallback else {
        diagnostics.emit(Diagnostic::OperationNameUnavailable);
        return document;
    };

    if let Some(ast::Definition::OperationDefinition(def)) = document
        .definitions
        .iter_mut()
        .find(|def| matches!(def, ast::Definition::OperationDefinition(_)))
    {
        def.make_mut().name = Some(name.clone());
        diagnostics.emit(Diagnostic::OperationNamed { name });
    }
    document
}

struct FirstField;

impl Visitor for FirstField {
    type Break = Name;

    fn field(&mut self, def: &ast::Field) -> ControlFlow<Name> {
        ControlFlow::Break(def.name.clone())
    }
}
