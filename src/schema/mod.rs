// Schema synthesis: node tree, type mapping, operator injection, walk and index rewrite.
mod exclude;
mod indexes;
mod mapper;
mod node;
mod operators;
mod walker;

pub use exclude::{DefaultExclusion, ExclusionPolicy};
pub use mapper::{Mode, TypeMapper};
pub use node::{Property, SchemaNode, resolve};
pub use operators::{OperatorInjector, OperatorSet, storage_type_codes};
pub use walker::build;

use crate::config::GeneratorConfig;
use crate::errors::SchemaError;
use crate::source::SourceSchema;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Result of one build. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedSchemas {
    pub strict: SchemaNode,
    pub query: SchemaNode,
}

impl GeneratedSchemas {
    #[must_use]
    pub fn strict_value(&self) -> Value {
        self.strict.to_value()
    }

    #[must_use]
    pub fn query_value(&self) -> Value {
        self.query.to_value()
    }
}

/// Entry point: holds the type mapper built from the frozen configuration.
#[derive(Debug, Clone)]
pub struct SchemaGenerator {
    mapper: TypeMapper,
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl SchemaGenerator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let languages: Arc<[String]> = config.languages.into();
        Self { mapper: TypeMapper::new(OperatorInjector::new(languages)) }
    }

    /// Build with the default exclusion policy.
    ///
    /// # Errors
    /// See [`build`].
    pub fn generate(&self, source: &SourceSchema) -> Result<GeneratedSchemas, SchemaError> {
        self.generate_with(source, &DefaultExclusion)
    }

    /// # Errors
    /// See [`build`].
    pub fn generate_with(
        &self,
        source: &SourceSchema,
        policy: &dyn ExclusionPolicy,
    ) -> Result<GeneratedSchemas, SchemaError> {
        let out = build(&self.mapper, source, policy)?;
        log::debug!(
            "generated schemas: {} strict / {} query top-level properties",
            out.strict.properties().count(),
            out.query.properties().count()
        );
        Ok(out)
    }

    /// Query schema only.
    ///
    /// # Errors
    /// See [`build`].
    pub fn search_schema(
        &self,
        source: &SourceSchema,
        policy: &dyn ExclusionPolicy,
    ) -> Result<Value, SchemaError> {
        Ok(self.generate_with(source, policy)?.query_value())
    }
}
