//! Depth-first traversal of executable documents.
//!
//! [`Visitor`] only reads the document and can stop early. Rewrites go through
//! [`transform::Transform`].
use std::ops::ControlFlow;

use apollo_compiler::Name;
use apollo_compiler::ast;

pub(crate) mod transform;

/// Traverse a document with the given visitor.
pub(crate) fn document<V: Visitor>(
    visitor: &mut V,
    document: &ast::Document,
) -> ControlFlow<V::Break> {
    document.definitions.iter().try_for_each(|def| match def {
        ast::Definition::OperationDefinition(def) => visitor.operation(def),
        ast::Definition::FragmentDefinition(def) => visitor.fragment_definition(def),
        _ => ControlFlow::Continue(()),
    })
}

pub(crate) trait Visitor: Sized {
    /// The value traversal stops with.
    type Break;

    /// Traverse an operation definition.
    ///
    /// Call the [`operation`] free function for the default behavior.
    fn operation(&mut self, def: &ast::OperationDefinition) -> ControlFlow<Self::Break> {
        operation(self, def)
    }

    /// Traverse a fragment definition.
    ///
    /// Call the [`fragment_definition`] free function for the default behavior.
    fn fragment_definition(&mut self, def: &ast::FragmentDefinition) -> ControlFlow<Self::Break> {
        fragment_definition(self, def)
    }

    /// Traverse a field within a selection set.
    ///
    /// Call the [`field`] free function for the default behavior.
    fn field(&mut self, def: &ast::Field) -> ControlFlow<Self::Break> {
        field(self, def)
    }

    /// Traverse an argument of a field or directive.
    ///
    /// Call the [`input_value`] free function on the argument value for the default behavior.
    fn argument(&mut self, def: &ast::Argument) -> ControlFlow<Self::Break> {
        input_value(self, &def.value)
    }

    /// Traverse a field of an input object literal.
    ///
    /// Call the [`input_value`] free function for the default behavior.
    fn object_field(&mut self, name: &Name, value: &ast::Value) -> ControlFlow<Self::Break> {
        let _ = name;
        input_value(self, value)
    }

    /// A variable referenced from an input value.
    fn variable(&mut self, name: &Name) -> ControlFlow<Self::Break> {
        let _ = name;
        ControlFlow::Continue(())
    }
}

/// The default behavior for traversing an operation.
pub(crate) fn operation<V: Visitor>(
    visitor: &mut V,
    def: &ast::OperationDefinition,
) -> ControlFlow<V::Break> {
    directives(visitor, &def.directives)?;
    selection_set(visitor, &def.selection_set)
}

/// The default behavior for traversing a fragment definition.
pub(crate) fn fragment_definition<V: Visitor>(
    visitor: &mut V,
    def: &ast::FragmentDefinition,
) -> ControlFlow<V::Break> {
    directives(visitor, &def.directives)?;
    selection_set(visitor, &def.selection_set)
}

/// The default behavior for traversing a field: arguments, then directives, then nested selections.
pub(crate) fn field<V: Visitor>(visitor: &mut V, def: &ast::Field) -> ControlFlow<V::Break> {
    def.arguments
        .iter()
        .try_for_each(|argument| visitor.argument(argument))?;
    directives(visitor, &def.directives)?;
    selection_set(visitor, &def.selection_set)
}

/// The default behavior for traversing an input value.
///
/// Lists and input objects are traversed in order. Variables are reported to
/// [`Visitor::variable`].
pub(crate) fn input_value<V: Visitor>(visitor: &mut V, value: &ast::Value) -> ControlFlow<V::Break> {
    match value {
        ast::Value::Variable(name) => visitor.variable(name),
        ast::Value::List(items) => items.iter().try_for_each(|item| input_value(visitor, item)),
        ast::Value::Object(fields) => fields
            .iter()
            .try_for_each(|(name, value)| visitor.object_field(name, value)),
        _ => ControlFlow::Continue(()),
    }
}

fn directives<V: Visitor>(visitor: &mut V, list: &ast::DirectiveList) -> ControlFlow<V::Break> {
    list.iter().try_for_each(|directive| {
        directive
            .arguments
            .iter()
            .try_for_each(|argument| visitor.argument(argument))
    })
}

fn selection_set<V: Visitor>(visitor: &mut V, set: &[ast::Selection]) -> ControlFlow<V::Break> {
    set.iter().try_for_each(|selection| match selection {
        ast::Selection::Field(def) => visitor.field(def),
        ast::Selection::FragmentSpread(def) => directives(visitor, &def.directives),
        ast::Selection::InlineFragment(def) => {
            directives(visitor, &def.directives)?;
            selection_set(visitor, &def.selection_set)
        }
    })
}
