//! Copy-on-write rewriting of executable documents.
//!
//! Every hook returns `Ok(None)` when the node is unchanged. Only the nodes on the way to a change are
//! cloned, so a rewritten document shares every untouched subtree with its input.
use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;

use crate::error::NormalizeError;

/// The replacement for a node, or `None` to keep it.
pub(crate) type Rewritten<T> = Result<Option<T>, NormalizeError>;

/// Rewrite a document with the given transform.
pub(crate) fn document(
    transform: &mut impl Transform,
    document: &ast::Document,
) -> Result<ast::Document, NormalizeError> {
    let definitions = list(&document.definitions, |def| match def {
        ast::Definition::OperationDefinition(def) => Ok(transform
            .operation(def)?
            .map(ast::Definition::OperationDefinition)),
        ast::Definition::FragmentDefinition(def) => Ok(transform
            .fragment_definition(def)?
            .map(ast::Definition::FragmentDefinition)),
        _ => Ok(None),
    })?;
    let mut document = document.clone();
    if let Some(definitions) = definitions {
        document.definitions = definitions;
    }
    Ok(document)
}

pub(crate) trait Transform: Sized {
    /// Rewrite an operation definition.
    ///
    /// Call the [`operation`] free function for the default behavior.
    fn operation(
        &mut self,
        def: &Node<ast::OperationDefinition>,
    ) -> Rewritten<Node<ast::OperationDefinition>> {
        operation(self, def)
    }

    /// Rewrite a fragment definition.
    ///
    /// Call the [`fragment_definition`] free function for the default behavior.
    fn fragment_definition(
        &mut self,
        def: &Node<ast::FragmentDefinition>,
    ) -> Rewritten<Node<ast::FragmentDefinition>> {
        fragment_definition(self, def)
    }

    /// Rewrite a fragment spread, possibly into another kind of selection.
    ///
    /// Call the [`fragment_spread`] free function for the default behavior.
    fn fragment_spread(&mut self, def: &Node<ast::FragmentSpread>) -> Rewritten<ast::Selection> {
        fragment_spread(self, def)
    }

    /// Rewrite a variable definition of an operation.
    ///
    /// Call the [`variable_definition`] free function for the default behavior.
    fn variable_definition(
        &mut self,
        def: &Node<ast::VariableDefinition>,
    ) -> Rewritten<Node<ast::VariableDefinition>> {
        variable_definition(self, def)
    }

    /// Rewrite a field within a selection set.
    ///
    /// Call the [`field`] free function for the default behavior.
    fn field(&mut self, def: &Node<ast::Field>) -> Rewritten<Node<ast::Field>> {
        field(self, def)
    }

    /// Rename a variable, wherever it is referenced.
    fn variable(&mut self, name: &Name) -> Rewritten<Name> {
        let _ = name;
        Ok(None)
    }
}

/// The default behavior for rewriting an operation.
pub(crate) fn operation(
    transform: &mut impl Transform,
    def: &Node<ast::OperationDefinition>,
) -> Rewritten<Node<ast::OperationDefinition>> {
    let variables = list(&def.variables, |var| transform.variable_definition(var))?;
    let directives = directives(transform, &def.directives)?;
    let selection_set = selection_set(transform, &def.selection_set)?;
    if variables.is_none() && directives.is_none() && selection_set.is_none() {
        return Ok(None);
    }

    let mut def = def.clone();
    let node = def.make_mut();
    if let Some(variables) = variables {
        node.variables = variables;
    }
    if let Some(directives) = directives {
        node.directives = directives;
    }
    if let Some(selection_set) = selection_set {
        node.selection_set = selection_set;
    }
    Ok(Some(def))
}

/// The default behavior for rewriting a fragment definition.
pub(crate) fn fragment_definition(
    transform: &mut impl Transform,
    def: &Node<ast::FragmentDefinition>,
) -> Rewritten<Node<ast::FragmentDefinition>> {
    let directives = directives(transform, &def.directives)?;
    let selection_set = selection_set(transform, &def.selection_set)?;
    if directives.is_none() && selection_set.is_none() {
        return Ok(None);
    }

    let mut def = def.clone();
    let node = def.make_mut();
    if let Some(directives) = directives {
        node.directives = directives;
    }
    if let Some(selection_set) = selection_set {
        node.selection_set = selection_set;
    }
    Ok(Some(def))
}

/// The default behavior for rewriting a variable definition: rename it through
/// [`Transform::variable`].
pub(crate) fn variable_definition(
    transform: &mut impl Transform,
    def: &Node<ast::VariableDefinition>,
) -> Rewritten<Node<ast::VariableDefinition>> {
    Ok(transform.variable(&def.name)?.map(|name| {
        let mut def = def.clone();
        def.make_mut().name = name;
        def
    }))
}

/// The default behavior for rewriting a field: arguments, then directives, then nested selections.
pub(crate) fn field(
    transform: &mut impl Transform,
    def: &Node<ast::Field>,
) -> Rewritten<Node<ast::Field>> {
    let arguments = arguments(transform, &def.arguments)?;
    let directives = directives(transform, &def.directives)?;
    let selection_set = selection_set(transform, &def.selection_set)?;
    if arguments.is_none() && directives.is_none() && selection_set.is_none() {
        return Ok(None);
    }

    let mut def = def.clone();
    let node = def.make_mut();
    if let Some(arguments) = arguments {
        node.arguments = arguments;
    }
    if let Some(directives) = directives {
        node.directives = directives;
    }
    if let Some(selection_set) = selection_set {
        node.selection_set = selection_set;
    }
    Ok(Some(def))
}

/// The default behavior for rewriting a fragment spread: rewrite its directives.
pub(crate) fn fragment_spread(
    transform: &mut impl Transform,
    def: &Node<ast::FragmentSpread>,
) -> Rewritten<ast::Selection> {
    Ok(directives(transform, &def.directives)?.map(|directives| {
        let mut def = def.clone();
        def.make_mut().directives = directives;
        ast::Selection::FragmentSpread(def)
    }))
}

/// Rewrite each selection of `set` through the hooks of `transform`.
pub(crate) fn selection_set(
    transform: &mut impl Transform,
    set: &[ast::Selection],
) -> Rewritten<Vec<ast::Selection>> {
    list(set, |selection| match selection {
        ast::Selection::Field(def) => Ok(transform.field(def)?.map(ast::Selection::Field)),
        ast::Selection::FragmentSpread(def) => transform.fragment_spread(def),
        ast::Selection::InlineFragment(def) => {
            let directives = directives(transform, &def.directives)?;
            let selection_set = selection_set(transform, &def.selection_set)?;
            if directives.is_none() && selection_set.is_none() {
                return Ok(None);
            }
            let mut def = def.clone();
            let node = def.make_mut();
            if let Some(directives) = directives {
                node.directives = directives;
            }
            if let Some(selection_set) = selection_set {
                node.selection_set = selection_set;
            }
            Ok(Some(ast::Selection::InlineFragment(def)))
        }
    })
}

fn directives(
    transform: &mut impl Transform,
    directives: &ast::DirectiveList,
) -> Rewritten<ast::DirectiveList> {
    let rewritten = list(&directives.0, |directive| {
        Ok(arguments(transform, &directive.arguments)?.map(|arguments| {
            let mut directive = directive.clone();
            directive.make_mut().arguments = arguments;
            directive
        }))
    })?;
    Ok(rewritten.map(ast::DirectiveList))
}

fn arguments(
    transform: &mut impl Transform,
    arguments: &[Node<ast::Argument>],
) -> Rewritten<Vec<Node<ast::Argument>>> {
    list(arguments, |argument| {
        Ok(input_value(transform, &argument.value)?.map(|value| {
            let mut argument = argument.clone();
            argument.make_mut().value = value;
            argument
        }))
    })
}

fn input_value(transform: &mut impl Transform, value: &Node<ast::Value>) -> Rewritten<Node<ast::Value>> {
    let rewritten = match &**value {
        ast::Value::Variable(name) => transform.variable(name)?.map(ast::Value::Variable),
        ast::Value::List(items) => {
            list(items, |item| input_value(transform, item))?.map(ast::Value::List)
        }
        ast::Value::Object(fields) => list(fields, |(name, value)| {
            Ok(input_value(transform, value)?.map(|value| (name.clone(), value)))
        })?
        .map(ast::Value::Object),
        _ => None,
    };
    Ok(rewritten.map(Node::new))
}

/// Rewrite each item of `items`, allocating a new list only once an item changes.
fn list<T: Clone>(items: &[T], mut rewrite: impl FnMut(&T) -> Rewritten<T>) -> Rewritten<Vec<T>> {
    let mut rewritten: Option<Vec<T>> = None;
    for (index, item) in items.iter().enumerate() {
        match rewrite(item)? {
            Some(new_item) => rewritten
                .get_or_insert_with(|| items[..index].to_vec())
                .push(new_item),
            None => {
                if let Some(rewritten) = &mut rewritten {
                    rewritten.push(item.clone());
                }
            }
        }
    }
    Ok(rewritten)
}
