//! Canonicalizes GraphQL operations so that equivalent operations share a cache key, and restores
//! the response keys the caller asked for once the canonical operation has been executed.
//!
//! ```ignore
//! let normalized = apollo_query_normalizer::normalize(query, Some(variables))?;
//! let data = execute(&normalized.query, normalized.variables.clone()).await?;
//! let data = normalized.rehydrate(data);
//! ```
//!
//! Hosts built on `tower` can use [`NormalizeLayer`] instead.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod json_ext;

mod alias_map;
mod configuration;
mod diagnostics;
mod error;
pub mod graphql;
mod layer;
mod normalize;
mod rehydrate;

pub use alias_map::ArgNameMap;
pub use alias_map::FieldAliasMap;
pub use alias_map::OriginalField;
pub use alias_map::StructuralPath;
pub use configuration::Configuration;
pub use configuration::PrintStyle;
pub use configuration::UnregisteredVariables;
pub use diagnostics::Diagnostic;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::NoopDiagnostics;
pub use diagnostics::TracingDiagnostics;
pub use error::NormalizeError;
pub use layer::NormalizeLayer;
pub use layer::NormalizeService;
pub use normalize::NormalizedQuery;
pub use normalize::Normalizer;
pub use normalize::fill_operation_name;
pub use normalize::normalize;
pub use normalize::normalize_field_access;
pub use normalize::normalize_variable_names;
pub use rehydrate::rehydrate;
