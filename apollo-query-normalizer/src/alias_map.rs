//! Rename maps produced by normalization.
//!
//! The [`FieldAliasMap`] is the only state that has to survive execution: it is recorded while the
//! operation is normalized and consumed when the response is rehydrated.
use std::fmt;

use apollo_compiler::Name;
use indexmap::IndexMap;
use serde::Serialize;
use serde::Serializer;

use crate::json_ext::Value;
use crate::rehydrate;

/// The chain of facing names (alias if present, else field name) from the root of a document down to,
/// but not including, a field.
///
/// Fragment spreads, inline fragments and list items do not add a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StructuralPath(Vec<String>);

impl StructuralPath {
    /// The path of root fields.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.0.push(name.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for StructuralPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.0.iter();
        if let Some(first) = names.next() {
            f.write_str(first)?;
            for name in names {
                write!(f, ".{name}")?;
            }
        }
        Ok(())
    }
}

impl Serialize for StructuralPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How a field was addressed by the caller before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalField {
    name: Name,
    alias: Option<Name>,
}

impl OriginalField {
    pub(crate) fn new(name: Name, alias: Option<Name>) -> Self {
        Self { name, alias }
    }

    /// The field name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The alias supplied by the caller, if any.
    pub fn alias(&self) -> Option<&Name> {
        self.alias.as_ref()
    }

    /// The response key the caller expects for this field.
    pub fn facing_name(&self) -> &str {
        self.alias.as_ref().unwrap_or(&self.name).as_str()
    }
}

/// Serializes as the original alias, or an empty string when the caller supplied none.
impl Serialize for OriginalField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.alias.as_ref().map_or("", |alias| alias.as_str()))
    }
}

/// Canonical response keys, grouped by the [`StructuralPath`] of their parent, mapped to the way the
/// caller originally addressed each field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldAliasMap(IndexMap<StructuralPath, IndexMap<String, OriginalField>>);

impl FieldAliasMap {
    /// The canonical keys recorded under `path`.
    pub fn get(&self, path: &StructuralPath) -> Option<&IndexMap<String, OriginalField>> {
        self.0.get(path)
    }

    /// The original field behind the canonical response key `key` under `path`.
    pub fn original(&self, path: &StructuralPath, key: &str) -> Option<&OriginalField> {
        self.0.get(path).and_then(|keys| keys.get(key))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StructuralPath, &IndexMap<String, OriginalField>)> {
        self.0.iter()
    }

    /// Restore the caller-facing keys of a response tree produced by the normalized operation.
    pub fn rehydrate(&self, data: Value) -> Value {
        rehydrate::transform_response(self, data)
    }

    pub(crate) fn scope_mut(&mut self, path: &StructuralPath) -> &mut IndexMap<String, OriginalField> {
        self.0.entry(path.clone()).or_default()
    }
}

/// Canonical variable names mapped back to the argument name they were derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgNameMap(IndexMap<Name, Name>);

impl ArgNameMap {
    /// The argument name that produced the canonical variable name `canonical`.
    pub fn get(&self, canonical: &str) -> Option<&Name> {
        self.0.get(canonical)
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.0.contains_key(canonical)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Name)> {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, canonical: Name, argument: Name) {
        self.0.insert(canonical, argument);
    }
}

impl Serialize for ArgNameMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.0
                .iter()
                .map(|(canonical, argument)| (canonical.as_str(), argument.as_str())),
        )
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn structural_path_displays_dot_joined() {
        assert_eq!(StructuralPath::root().to_string(), "");
        let path: StructuralPath = ["echo1", "k"].into_iter().collect();
        assert_eq!(path.to_string(), "echo1.k");
        assert_eq!(path.len(), 2);
        assert_eq!(path.iter().collect::<Vec<_>>(), ["echo1", "k"]);
    }

    #[test]
    fn paths_differing_in_one_name_are_distinct() {
        let first: StructuralPath = ["echo1", "k"].into_iter().collect();
        let second: StructuralPath = ["echo2", "k"].into_iter().collect();
        assert_ne!(first, second);
    }

    #[test]
    fn serializes_original_alias_or_empty() {
        let mut map = FieldAliasMap::default();
        let root = map.scope_mut(&StructuralPath::root());
        root.insert(
            "echo".to_string(),
            OriginalField::new(name!("echo"), Some(name!("first"))),
        );
        root.insert("echo1".to_string(), OriginalField::new(name!("echo"), None));

        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            serde_json::json!({ "": { "echo": "first", "echo1": "" } })
        );
        assert_eq!(
            map.iter()
                .map(|(path, keys)| (path.to_string(), keys.len()))
                .collect::<Vec<_>>(),
            [(String::new(), 2)]
        );
        assert_eq!(
            map.original(&StructuralPath::root(), "echo1")
                .map(OriginalField::facing_name),
            Some("echo")
        );
    }
}
