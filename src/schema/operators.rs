//! Operator injection.
//!
//! Each augmenter returns an [`OperatorSet`]; callers merge the sets and turn the
//! result into the operator-object alternative of a query fragment. A filter object
//! matches that alternative when it carries any one (or several) of the enabled keys.

use crate::source::{BaseType, FieldOptions};
use bson::spec::ElementType;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Storage type codes accepted by `$type`, in the order they are emitted.
/// `-1` is the min-key alias next to its byte code.
pub fn storage_type_codes() -> Vec<i32> {
    const CODES: [ElementType; 17] = [
        ElementType::Double,
        ElementType::String,
        ElementType::EmbeddedDocument,
        ElementType::Array,
        ElementType::Binary,
        ElementType::ObjectId,
        ElementType::Boolean,
        ElementType::DateTime,
        ElementType::Null,
        ElementType::RegularExpression,
        ElementType::DbPointer,
        ElementType::JavaScriptCode,
        ElementType::Symbol,
        ElementType::JavaScriptCodeWithScope,
        ElementType::Int32,
        ElementType::Timestamp,
        ElementType::Int64,
    ];
    let mut out: Vec<i32> = CODES.iter().map(|t| i32::from(*t as u8)).collect();
    out.push(-1);
    out.push(i32::from(ElementType::MinKey as u8));
    out.push(i32::from(ElementType::MaxKey as u8));
    out
}

/// Operator keys for one object fragment, plus one `{required: [key]}` per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorSet {
    properties: Map<String, Value>,
    any_of: Vec<Value>,
}

impl OperatorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` when `enabled`.
    #[must_use]
    pub fn with(mut self, enabled: bool, key: &str, schema: Value) -> Self {
        if enabled {
            self.properties.insert(key.to_string(), schema);
            self.any_of.push(json!({ "required": [key] }));
        }
        self
    }

    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.properties.extend(other.properties);
        for req in other.any_of {
            if !self.any_of.contains(&req) {
                self.any_of.push(req);
            }
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Closed object fragment, or `None` when no operator is enabled.
    #[must_use]
    pub fn into_fragment(self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        Some(json!({
            "type": "object",
            "properties": self.properties,
            "anyOf": self.any_of,
            "additionalProperties": false,
        }))
    }
}

fn array_of(base: BaseType) -> Value {
    json!({ "type": "array", "minItems": 1, "items": { "type": base.as_str() } })
}

/// Builds operator sets; holds the frozen text-search language list.
#[derive(Debug, Clone)]
pub struct OperatorInjector {
    languages: Arc<[String]>,
    type_codes: Arc<[i32]>,
}

impl OperatorInjector {
    #[must_use]
    pub fn new(languages: Arc<[String]>) -> Self {
        Self { languages, type_codes: storage_type_codes().into() }
    }

    #[must_use]
    pub fn comparison(&self, base: BaseType, o: &FieldOptions) -> OperatorSet {
        let scalar = json!({ "type": base.as_str() });
        OperatorSet::new()
            .with(o.lte, "$lte", scalar.clone())
            .with(o.lt, "$lt", scalar.clone())
            .with(o.gte, "$gte", scalar.clone())
            .with(o.gt, "$gt", scalar.clone())
            .with(o.ne, "$ne", scalar)
            .with(o.in_op, "$in", array_of(base))
            .with(o.nin, "$nin", array_of(base))
    }

    #[must_use]
    pub fn element(&self, o: &FieldOptions) -> OperatorSet {
        OperatorSet::new()
            .with(o.exists, "$exists", json!({ "type": "boolean" }))
            .with(o.type_op, "$type", json!({ "enum": &*self.type_codes }))
    }

    #[must_use]
    pub fn array(&self, base: BaseType, o: &FieldOptions) -> OperatorSet {
        OperatorSet::new()
            .with(o.all, "$all", array_of(base))
            .with(o.size, "$size", json!({ "type": "number" }))
    }

    /// `$text` argument: requires `$search`, optional `$language`.
    #[must_use]
    pub fn text_argument(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "$search": { "type": "string" },
                "$language": { "enum": &*self.languages },
            },
            "required": ["$search"],
            "additionalProperties": false,
        })
    }

    #[must_use]
    pub fn text_search(&self, o: &FieldOptions) -> OperatorSet {
        OperatorSet::new()
            .with(o.text, "$text", self.text_argument())
            .with(o.regex, "$regex", json!({ "type": "string" }))
            .with(o.options, "$options", json!({ "type": "string" }))
    }

    /// `$geoWithin` with an optional `$geometry` restricted to polygons.
    #[must_use]
    pub fn geo(&self, o: &FieldOptions) -> OperatorSet {
        let geometry = json!({
            "type": "object",
            "properties": {
                "type": { "enum": ["Polygon", "MultiPolygon"] },
                "coordinates": { "type": "array" },
            },
            "required": ["type", "coordinates"],
            "additionalProperties": false,
        });
        let within = OperatorSet::new()
            .with(o.geo_within_geometry, "$geometry", geometry)
            .into_fragment()
            .unwrap_or_else(|| json!({ "type": "object" }));
        OperatorSet::new().with(o.geo_within, "$geoWithin", within)
    }

    /// Every per-field operator that applies to `base`.
    #[must_use]
    pub fn field_operators(&self, base: BaseType, o: &FieldOptions, is_array: bool) -> OperatorSet {
        let mut set = self.comparison(base, o).merge(self.element(o));
        if base == BaseType::String {
            set = set.merge(self.text_search(o));
        }
        if is_array {
            set = set.merge(self.array(base, o));
        }
        set
    }
}
