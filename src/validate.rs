//! Checking documents and filters against generated schemas.
//!
//! Generated schemas use the draft-04 vocabulary, so validators are compiled for draft 4.

use crate::errors::{SchemaError, Violation, Violations};
use crate::schema::GeneratedSchemas;
use jsonschema::Validator;
use serde_json::Value;

/// A compiled validator for one generated schema.
pub struct SchemaValidator {
    validator: Validator,
}

impl SchemaValidator {
    /// # Errors
    /// Returns `ValidatorBuild` if the schema does not compile.
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft4);
        let validator = opts.build(schema).map_err(|e| SchemaError::ValidatorBuild(e.to_string()))?;
        Ok(Self { validator })
    }

    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// # Errors
    /// Returns `ValidationFailed` listing every violation.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            log::debug!("instance rejected with {} violations", violations.len());
            Err(SchemaError::ValidationFailed { violations: Violations(violations) })
        }
    }
}

impl GeneratedSchemas {
    /// Check document data against the strict schema.
    ///
    /// # Errors
    /// `ValidatorBuild` or `ValidationFailed`.
    pub fn validate_document(&self, document: &Value) -> Result<(), SchemaError> {
        SchemaValidator::new(&self.strict_value())?.validate(document)
    }

    /// Check a filter expression against the query schema.
    ///
    /// # Errors
    /// `ValidatorBuild` or `ValidationFailed`.
    pub fn validate_filter(&self, filter: &Value) -> Result<(), SchemaError> {
        SchemaValidator::new(&self.query_value())?.validate(filter)
    }
}
