//! Normalizer configuration.
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// Configuration for a [`Normalizer`](crate::Normalizer).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// What to do with a variable that is not bound to any argument or input object field.
    pub unregistered_variables: UnregisteredVariables,

    /// How the normalized operation is printed.
    pub print: PrintStyle,

    /// Limit recursion in the GraphQL parser to protect against stack overflow.
    /// default: 500
    pub parser_recursion_limit: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            unregistered_variables: UnregisteredVariables::default(),
            print: PrintStyle::default(),
            parser_recursion_limit: default_parser_recursion_limit(),
        }
    }
}

const fn default_parser_recursion_limit() -> usize {
    // deep enough for any operation a client sends on purpose
    500
}

/// Policy for variables that normalization has no canonical name for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnregisteredVariables {
    /// Keep the variable under its original name.
    #[default]
    PassThrough,
    /// Fail normalization.
    Reject,
}

/// Layout of the printed operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrintStyle {
    /// Indented, one selection per line.
    #[default]
    Pretty,
    /// Single line.
    Compact,
}
