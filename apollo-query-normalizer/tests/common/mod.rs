//! A minimal executor for the echo schema:
//!
//! ```graphql
//! type Query {
//!   echo(input: EchoInput): EchoRes
//! }
//! ```
//!
//! Every root field answers with its `input` argument, and nested fields read the value of the same
//! name from their parent. Results depend on field names and arguments only, which is what
//! normalization has to preserve.
#![allow(dead_code)]

use std::collections::HashMap;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_query_normalizer::json_ext::Object;
use apollo_query_normalizer::json_ext::Value;
use serde_json_bytes::ByteString;
use serde_json_bytes::json;

pub fn object(value: Value) -> Object {
    value.as_object().cloned().unwrap()
}

pub fn execute(query: &str, variables: &Object) -> Value {
    let document = ast::Document::parse(query, "query.graphql").unwrap();
    let fragments: HashMap<_, _> = document
        .definitions
        .iter()
        .filter_map(|def| match def {
            ast::Definition::FragmentDefinition(def) => Some((def.name.clone(), def.clone())),
            _ => None,
        })
        .collect();
    let operation = document
        .definitions
        .iter()
        .find_map(|def| match def {
            ast::Definition::OperationDefinition(def) => Some(def.clone()),
            _ => None,
        })
        .expect("an operation");

    let executor = Executor {
        variables,
        fragments: &fragments,
    };
    let mut data = Object::new();
    executor.select(&operation.selection_set, None, &mut data);
    Value::Object(data)
}

struct Executor<'a> {
    variables: &'a Object,
    fragments: &'a HashMap<Name, Node<ast::FragmentDefinition>>,
}

impl Executor<'_> {
    /// Resolve `selections` against `parent`, or against the root when there is no parent.
    fn select(&self, selections: &[ast::Selection], parent: Option<&Value>, output: &mut Object) {
        for selection in selections {
            match selection {
                ast::Selection::Field(field) => {
                    let resolved = match parent {
                        None => field
                            .arguments
                            .iter()
                            .find(|argument| argument.name.as_str() == "input")
                            .map(|argument| self.input_value(&argument.value))
                            .unwrap_or(Value::Null),
                        Some(parent) => parent.get(field.name.as_str()).cloned().unwrap_or(Value::Null),
                    };
                    let value = self.complete(&field.selection_set, resolved);
                    let key = field.alias.as_ref().unwrap_or(&field.name).as_str();
                    match output.get_mut(key) {
                        Some(existing) => merge(existing, value),
                        None => {
                            output.insert(ByteString::from(key), value);
                        }
                    }
                }
                ast::Selection::FragmentSpread(spread) => {
                    let fragment = &self.fragments[&spread.fragment_name];
                    self.select(&fragment.selection_set, parent, output);
                }
                ast::Selection::InlineFragment(inline) => {
                    self.select(&inline.selection_set, parent, output);
                }
            }
        }
    }

    fn complete(&self, selections: &[ast::Selection], value: Value) -> Value {
        if selections.is_empty() {
            return value;
        }
        match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.complete(selections, item))
                    .collect(),
            ),
            Value::Null => Value::Null,
            value => {
                let mut output = Object::new();
                self.select(selections, Some(&value), &mut output);
                Value::Object(output)
            }
        }
    }

    fn input_value(&self, value: &ast::Value) -> Value {
        match value {
            ast::Value::Null => Value::Null,
            ast::Value::Variable(name) => self
                .variables
                .get(name.as_str())
                .cloned()
                .unwrap_or(Value::Null),
            ast::Value::Enum(name) => json!(name.as_str()),
            ast::Value::String(value) => json!(value.as_str()),
            ast::Value::Boolean(value) => json!(*value),
            ast::Value::Int(value) => json!(value.as_str().parse::<i64>().unwrap()),
            ast::Value::Float(value) => json!(value.try_to_f64().unwrap()),
            ast::Value::List(items) => {
                Value::Array(items.iter().map(|item| self.input_value(item)).collect())
            }
            ast::Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (ByteString::from(name.as_str()), self.input_value(value)))
                    .collect(),
            ),
        }
    }
}

/// Merge the results of two selections answering under the same key.
fn merge(existing: &mut Value, other: Value) {
    match (existing, other) {
        (Value::Object(existing), Value::Object(other)) => {
            for (key, value) in other {
                match existing.get_mut(key.as_str()) {
                    Some(slot) => merge(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(existing), Value::Array(other)) => {
            for (slot, value) in existing.iter_mut().zip(other) {
                merge(slot, value);
            }
        }
        _ => {}
    }
}
