//! Normalization errors.
use apollo_compiler::InvalidNameError;
use displaydoc::Display;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::graphql;

/// Errors raised while normalizing an operation.
///
/// Rehydration never fails, so every variant here is raised before the operation is executed.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NormalizeError {
    /// parsing error: {0}
    ParsingError(String),
    /// variable '${0}' is not bound to any argument
    UnregisteredVariable(String),
    /// cannot build a canonical name: {0}
    InvalidName(String),
    /// unknown fragment '{0}'
    UnknownFragment(String),
    /// fragment '{0}' spreads itself
    FragmentCycle(String),
}

impl From<InvalidNameError> for NormalizeError {
    fn from(error: InvalidNameError) -> Self {
        NormalizeError::InvalidName(error.to_string())
    }
}

impl NormalizeError {
    /// The `extensions.code` reported to clients for this error.
    pub const fn extension_code(&self) -> &'static str {
        match self {
            NormalizeError::ParsingError(_) => "PARSING_ERROR",
            NormalizeError::UnregisteredVariable(_) => "UNREGISTERED_VARIABLE",
            NormalizeError::InvalidName(_) => "INVALID_NAME",
            NormalizeError::UnknownFragment(_) => "UNKNOWN_FRAGMENT",
            NormalizeError::FragmentCycle(_) => "FRAGMENT_CYCLE",
        }
    }

    /// Convert into a GraphQL error suitable for a response.
    pub fn to_graphql_error(&self) -> graphql::Error {
        graphql::Error::builder()
            .message(self.to_string())
            .extension_code(self.extension_code())
            .build()
    }
}
