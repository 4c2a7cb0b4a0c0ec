use crate::source::{BaseType, FieldKind, FieldOptions};
use serde_json::{Value, json};

use super::operators::OperatorInjector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Validates document data.
    Strict,
    /// Validates filter expressions.
    Query,
}

/// Maps one declared field kind to a JSON-Schema fragment.
///
/// Returns `None` when the field must be dropped: disabled kinds, kinds strict mode
/// cannot express, and subdocuments (the walker owns those).
#[derive(Debug, Clone)]
pub struct TypeMapper {
    injector: OperatorInjector,
}

impl TypeMapper {
    #[must_use]
    pub fn new(injector: OperatorInjector) -> Self {
        Self { injector }
    }

    #[must_use]
    pub fn injector(&self) -> &OperatorInjector {
        &self.injector
    }

    #[must_use]
    pub fn map_type(&self, kind: &FieldKind, options: &FieldOptions, mode: Mode) -> Option<Value> {
        match mode {
            Mode::Strict => strict_fragment(kind),
            Mode::Query => self.query_fragment(kind, options),
        }
    }

    fn query_fragment(&self, kind: &FieldKind, options: &FieldOptions) -> Option<Value> {
        match kind {
            FieldKind::Disabled | FieldKind::Subdocument(_) => None,
            FieldKind::Mixed | FieldKind::Unsupported(_) => Some(json!({})),
            FieldKind::ArrayOf(inner) => match inner.innermost() {
                FieldKind::Subdocument(_) | FieldKind::Disabled => None,
                FieldKind::Mixed | FieldKind::Unsupported(_) => Some(json!({})),
                scalar => scalar.base_type().and_then(|b| self.literal_or_operators(b, options, true)),
            },
            scalar => scalar.base_type().and_then(|b| self.literal_or_operators(b, options, false)),
        }
    }

    /// `{oneOf: [literal, operator-object]}`, honouring `equal` and `equalStrict`.
    fn literal_or_operators(&self, base: BaseType, options: &FieldOptions, is_array: bool) -> Option<Value> {
        let mut one_of = Vec::with_capacity(2);
        if options.equal {
            one_of.push(json!({ "type": base.as_str() }));
        }
        if !options.equal_strict
            && let Some(ops) = self.injector.field_operators(base, options, is_array).into_fragment()
        {
            one_of.push(ops);
        }
        if one_of.is_empty() {
            return None;
        }
        Some(json!({ "oneOf": one_of }))
    }
}

fn strict_fragment(kind: &FieldKind) -> Option<Value> {
    match kind {
        FieldKind::Mixed => Some(json!({})),
        FieldKind::ArrayOf(inner) => {
            strict_fragment(inner).map(|items| json!({ "type": "array", "items": items }))
        }
        FieldKind::Disabled | FieldKind::Unsupported(_) | FieldKind::Subdocument(_) => None,
        scalar => scalar.base_type().map(|b| json!({ "type": b.as_str() })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::source::SourceSchema;

    fn mapper() -> TypeMapper {
        let langs = GeneratorConfig::default().languages.into();
        TypeMapper::new(OperatorInjector::new(langs))
    }

    #[test]
    fn strict_scalars_and_arrays() {
        let m = mapper();
        let o = FieldOptions::default();
        assert_eq!(m.map_type(&FieldKind::Date, &o, Mode::Strict), Some(json!({"type": "string"})));
        assert_eq!(m.map_type(&FieldKind::Reference, &o, Mode::Strict), Some(json!({"type": "string"})));
        assert_eq!(
            m.map_type(&FieldKind::ArrayOf(Box::new(FieldKind::Number)), &o, Mode::Strict),
            Some(json!({"type": "array", "items": {"type": "number"}}))
        );
        assert_eq!(
            m.map_type(&FieldKind::ArrayOf(Box::new(FieldKind::Mixed)), &o, Mode::Strict),
            Some(json!({"type": "array", "items": {}}))
        );
    }

    #[test]
    fn disabled_is_absent_in_both_modes() {
        let m = mapper();
        let o = FieldOptions::default();
        assert_eq!(m.map_type(&FieldKind::Disabled, &o, Mode::Strict), None);
        assert_eq!(m.map_type(&FieldKind::Disabled, &o, Mode::Query), None);
    }

    #[test]
    fn unsupported_only_permissive_in_query_mode() {
        let m = mapper();
        let o = FieldOptions::default();
        let k = FieldKind::Unsupported("Buffer".into());
        assert_eq!(m.map_type(&k, &o, Mode::Strict), None);
        assert_eq!(m.map_type(&k, &o, Mode::Query), Some(json!({})));
    }

    #[test]
    fn subdocuments_left_to_walker() {
        let m = mapper();
        let o = FieldOptions::default();
        let sub = FieldKind::Subdocument(Box::new(SourceSchema::new()));
        assert_eq!(m.map_type(&sub, &o, Mode::Strict), None);
        let arr = FieldKind::ArrayOf(Box::new(sub));
        assert_eq!(m.map_type(&arr, &o, Mode::Query), None);
    }

    #[test]
    fn query_number_has_literal_and_operator_alternatives() {
        let v = mapper().map_type(&FieldKind::Number, &FieldOptions::default(), Mode::Query).unwrap();
        let one_of = v["oneOf"].as_array().unwrap();
        assert_eq!(one_of.len(), 2);
        assert_eq!(one_of[0], json!({"type": "number"}));
        assert_eq!(one_of[1]["properties"]["$gte"], json!({"type": "number"}));
        assert!(one_of[1]["properties"].get("$all").is_none());
    }

    #[test]
    fn query_array_of_scalar_gets_array_operators() {
        let k = FieldKind::ArrayOf(Box::new(FieldKind::String));
        let v = mapper().map_type(&k, &FieldOptions::default(), Mode::Query).unwrap();
        assert_eq!(v["oneOf"][0], json!({"type": "string"}));
        assert_eq!(v["oneOf"][1]["properties"]["$all"]["items"], json!({"type": "string"}));
        assert_eq!(v["oneOf"][1]["properties"]["$size"], json!({"type": "number"}));
    }

    #[test]
    fn equal_strict_suppresses_operators() {
        let o = FieldOptions { equal_strict: true, ..FieldOptions::default() };
        let v = mapper().map_type(&FieldKind::Boolean, &o, Mode::Query).unwrap();
        assert_eq!(v, json!({"oneOf": [{"type": "boolean"}]}));
        let none = FieldOptions { equal: false, equal_strict: true, ..FieldOptions::default() };
        assert_eq!(mapper().map_type(&FieldKind::Boolean, &none, Mode::Query), None);
    }

    #[test]
    fn no_operators_enabled_leaves_literal_only() {
        let o = FieldOptions {
            exists: false,
            type_op: false,
            lte: false,
            lt: false,
            gte: false,
            gt: false,
            ne: false,
            in_op: false,
            nin: false,
            ..FieldOptions::default()
        };
        let v = mapper().map_type(&FieldKind::Number, &o, Mode::Query).unwrap();
        assert_eq!(v, json!({"oneOf": [{"type": "number"}]}));
    }
}
