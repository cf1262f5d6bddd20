//! Field-access normalization.
//!
//! Every field gets a response key that only depends on its name and on how many fields of the same
//! name came before it under the same parent: the first keeps its name, the next ones get `name1`,
//! `name2` and so on. The key the caller asked for is remembered in a [`FieldAliasMap`].
//!
//! A named fragment can be spread under several parents, each with its own keys, so every spread is
//! replaced by an inline fragment normalized in the scope it is spread into. Fragment definitions are
//! left out of the normalized document.
use std::collections::HashMap;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;

use super::traverse::transform;
use super::traverse::transform::Rewritten;
use super::traverse::transform::Transform;
use crate::alias_map::FieldAliasMap;
use crate::alias_map::OriginalField;
use crate::alias_map::StructuralPath;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticSink;
use crate::error::NormalizeError;

/// Give every field its canonical alias and record the aliases the caller used.
pub fn normalize_field_access(
    document: &ast::Document,
    diagnostics: &dyn DiagnosticSink,
) -> Result<(ast::Document, FieldAliasMap), NormalizeError> {
    let fragments = document
        .definitions
        .iter()
        .filter_map(|def| match def {
            ast::Definition::FragmentDefinition(def) => Some((def.name.clone(), def.clone())),
            _ => None,
        })
        .collect();
    let mut normalizer = FieldAccessNormalizer {
        path: StructuralPath::root(),
        fragments,
        spreading: Vec::new(),
        access_counts: HashMap::new(),
        field_alias_map: FieldAliasMap::default(),
        diagnostics,
    };
    let mut document = transform::document(&mut normalizer, document)?;
    document
        .definitions
        .retain(|def| !matches!(def, ast::Definition::FragmentDefinition(_)));
    Ok((document, normalizer.field_alias_map))
}

struct FieldAccessNormalizer<'a> {
    /// Facing names of the enclosing fields.
    path: StructuralPath,
    fragments: HashMap<Name, Node<ast::FragmentDefinition>>,
    /// Fragments being inlined, outermost first.
    spreading: Vec<Name>,
    /// How many times each field name was seen, per path.
    access_counts: HashMap<StructuralPath, HashMap<Name, usize>>,
    field_alias_map: FieldAliasMap,
    diagnostics: &'a dyn DiagnosticSink,
}

impl FieldAccessNormalizer<'_> {
    /// Pick the response key of the next `def` at the current path and record where it came from.
    fn canonical_key(&mut self, def: &ast::Field) -> Result<Name, NormalizeError> {
        let counts = self.access_counts.entry(self.path.clone()).or_default();
        let scope = self.field_alias_map.scope_mut(&self.path);

        let mut count = counts.get(&def.name).copied().unwrap_or_default();
        let key = loop {
            let key = if count == 0 {
                def.name.clone()
            } else {
                Name::new(&format!("{}{count}", def.name))?
            };
            // a sibling can already answer under that key, e.g. a real field called `name1`
            if !scope.contains_key(key.as_str()) {
                break key;
            }
            count += 1;
        };
        counts.insert(def.name.clone(), count + 1);
        scope.insert(
            key.to_string(),
            OriginalField::new(def.name.clone(), def.alias.clone()),
        );
        Ok(key)
    }
}

impl Transform for FieldAccessNormalizer<'_> {
    /// Fragment definitions are only normalized where they are spread.
    fn fragment_definition(
        &mut self,
        _def: &Node<ast::FragmentDefinition>,
    ) -> Rewritten<Node<ast::FragmentDefinition>> {
        Ok(None)
    }

    fn fragment_spread(&mut self, def: &Node<ast::FragmentSpread>) -> Rewritten<ast::Selection> {
        let name = &def.fragment_name;
        let Some(fragment) = self.fragments.get(name).cloned() else {
            return Err(NormalizeError::UnknownFragment(name.to_string()));
        };
        if self.spreading.contains(name) {
            return Err(NormalizeError::FragmentCycle(name.to_string()));
        }

        self.spreading.push(name.clone());
        let selection_set = transform::selection_set(self, &fragment.selection_set);
        self.spreading.pop();
        let selection_set = selection_set?.unwrap_or_else(|| fragment.selection_set.clone());

        Ok(Some(ast::Selection::InlineFragment(Node::new(
            ast::InlineFragment {
                type_condition: Some(fragment.type_condition.clone()),
                directives: def.directives.clone(),
                selection_set,
            },
        ))))
    }

    fn field(&mut self, def: &Node<ast::Field>) -> Rewritten<Node<ast::Field>> {
        let key = self.canonical_key(def)?;
        let alias = (key != def.name).then_some(key);
        if let Some(alias) = &alias {
            self.diagnostics.emit(Diagnostic::FieldAliased {
                path: self.path.clone(),
                field: def.name.clone(),
                alias: alias.clone(),
            });
        }

        let facing_name = def.alias.as_ref().unwrap_or(&def.name);
        self.path.push(facing_name.as_str());
        let rewritten = transform::field(self, def);
        self.path.pop();
        let rewritten = rewritten?;

        if rewritten.is_none() && alias == def.alias {
            return Ok(None);
        }
        let mut def = rewritten.unwrap_or_else(|| def.clone());
        def.make_mut().alias = alias;
        Ok(Some(def))
    }
}
