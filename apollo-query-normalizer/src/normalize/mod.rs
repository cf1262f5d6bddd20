//! The canonicalization pipeline.
//!
//! Field aliases are normalized first, then variable names, then a missing operation name is filled
//! in. The result is printed and bundled with what is needed to rehydrate the response.
use std::fmt;
use std::sync::Arc;

use apollo_compiler::ast;
use apollo_compiler::parser::Parser;

use crate::alias_map::ArgNameMap;
use crate::alias_map::FieldAliasMap;
use crate::configuration::Configuration;
use crate::configuration::PrintStyle;
use crate::diagnostics::DiagnosticSink;
use crate::diagnostics::NoopDiagnostics;
use crate::error::NormalizeError;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::rehydrate::rehydrate;

pub(crate) mod field_access;
pub(crate) mod operation_name;
pub(crate) mod traverse;
pub(crate) mod variables;

pub use field_access::normalize_field_access;
pub use operation_name::fill_operation_name;
pub use variables::normalize_variable_names;

/// Normalize `query` with the default configuration.
pub fn normalize(query: &str, variables: Option<Object>) -> Result<NormalizedQuery, NormalizeError> {
    Normalizer::default().normalize(query, variables)
}

/// Normalizes operations according to a [`Configuration`].
///
/// Cloning is cheap. A normalizer holds no state between calls, so the same one can serve concurrent
/// requests.
#[derive(Clone)]
pub struct Normalizer {
    configuration: Arc<Configuration>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("configuration", &self.configuration)
            .finish_non_exhaustive()
    }
}

impl Normalizer {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration: Arc::new(configuration),
            diagnostics: Arc::new(NoopDiagnostics),
        }
    }

    /// Report what normalization does to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Parse and normalize `query`.
    pub fn normalize(
        &self,
        query: &str,
        variables: Option<Object>,
    ) -> Result<NormalizedQuery, NormalizeError> {
        let document = Parser::new()
            .recursion_limit(self.configuration.parser_recursion_limit)
            .parse_ast(query, "query.graphql")
            .map_err(|invalid| NormalizeError::ParsingError(invalid.errors.to_string()))?;
        self.normalize_document(&document, variables)
    }

    /// Normalize an already parsed `document`. The document itself is left as it is.
    pub fn normalize_document(
        &self,
        document: &ast::Document,
        variables: Option<Object>,
    ) -> Result<NormalizedQuery, NormalizeError> {
        let diagnostics = &*self.diagnostics;
        // taken before fragment spreads are inlined, so that a leading fragment can still name the
        // operation
        let fallback_name = operation_name::fallback_name(document);
        let (document, field_alias_map) = normalize_field_access(document, diagnostics)?;
        let (document, variables, arg_name_map) = normalize_variable_names(
            &document,
            variables,
            self.configuration.unregistered_variables,
            diagnostics,
        )?;
        let ast = operation_name::name_operation(&document, fallback_name, diagnostics);

        let query = match self.configuration.print {
            PrintStyle::Pretty => ast.to_string(),
            PrintStyle::Compact => ast.serialize().no_indent().to_string(),
        };
        Ok(NormalizedQuery {
            ast,
            query,
            variables,
            arg_name_map,
            field_alias_map,
        })
    }
}

/// A normalized operation, and what is needed to rehydrate its response.
///
/// Keep it for as long as the request it was made for: its [`FieldAliasMap`] only fits responses to
/// that request.
#[derive(Debug, Clone)]
pub struct NormalizedQuery {
    /// The normalized document.
    pub ast: ast::Document,
    /// The normalized document, printed.
    pub query: String,
    /// The variable values, relabeled with the canonical variable names.
    pub variables: Option<Object>,
    pub arg_name_map: ArgNameMap,
    pub field_alias_map: FieldAliasMap,
}

impl NormalizedQuery {
    /// Restore the response keys the caller asked for in response `data`.
    pub fn rehydrate(&self, data: Option<Value>) -> Option<Value> {
        rehydrate(Some(&self.field_alias_map), data)
    }
}
