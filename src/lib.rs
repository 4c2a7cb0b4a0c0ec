pub mod cli;
pub mod config;
pub mod errors;
pub mod logger;
pub mod schema;
pub mod source;
pub mod validate;

pub use crate::config::{ConfigSources, GeneratorConfig};
pub use crate::errors::SchemaError;
pub use crate::schema::{
    DefaultExclusion, ExclusionPolicy, GeneratedSchemas, Property, SchemaGenerator, SchemaNode,
};
pub use crate::source::{FieldDecl, FieldKind, FieldOptions, IndexDecl, SourceSchema};
pub use crate::validate::SchemaValidator;

/// Build strict and query schemas with the default configuration and exclusion policy.
///
/// # Errors
/// Returns an error for declarations the engine cannot build (see [`SchemaError`]).
pub fn generate(source: &SourceSchema) -> Result<GeneratedSchemas, SchemaError> {
    SchemaGenerator::default().generate(source)
}

/// Query schema only, with a caller-supplied exclusion policy.
///
/// # Errors
/// Returns an error for declarations the engine cannot build (see [`SchemaError`]).
pub fn search_schema(
    source: &SourceSchema,
    policy: &dyn ExclusionPolicy,
) -> Result<serde_json::Value, SchemaError> {
    SchemaGenerator::default().search_schema(source, policy)
}

/// Initializes logging from `log4rs.yaml`.
///
/// Call once before generating if log output is wanted.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
