use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declared kind of one field, resolved once when a declaration is ingested.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Date,
    Reference,
    Mixed,
    ArrayOf(Box<FieldKind>),
    Subdocument(Box<SourceSchema>),
    /// Declared as `false`.
    Disabled,
    /// A type name this crate does not understand.
    Unsupported(String),
}

/// JSON-Schema base type a scalar kind serializes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    String,
    Number,
    Boolean,
}

impl BaseType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

impl FieldKind {
    /// Base type of a scalar kind; `None` for mixed, arrays, subdocuments and unusable kinds.
    #[must_use]
    pub const fn base_type(&self) -> Option<BaseType> {
        match self {
            Self::String | Self::Date | Self::Reference => Some(BaseType::String),
            Self::Number => Some(BaseType::Number),
            Self::Boolean => Some(BaseType::Boolean),
            _ => None,
        }
    }

    /// Nested schema when the kind is an array of subdocuments.
    #[must_use]
    pub fn subdocument_array(&self) -> Option<&SourceSchema> {
        match self {
            Self::ArrayOf(inner) => match inner.as_ref() {
                Self::Subdocument(schema) => Some(schema),
                _ => None,
            },
            _ => None,
        }
    }

    /// Element kind after unwrapping every array level.
    #[must_use]
    pub fn innermost(&self) -> &Self {
        match self {
            Self::ArrayOf(inner) => inner.innermost(),
            other => other,
        }
    }

    /// Parse a declared type name. Matching is case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Self::String,
            "number" | "double" | "int" | "int32" | "int64" | "long" | "decimal" => Self::Number,
            "boolean" | "bool" => Self::Boolean,
            "date" | "datetime" => Self::Date,
            "objectid" | "reference" | "ref" => Self::Reference,
            "mixed" | "any" => Self::Mixed,
            _ => Self::Unsupported(name.to_string()),
        }
    }
}

fn yes() -> bool {
    true
}

/// Per-field switches controlling which query operators are generated.
///
/// Everything defaults to enabled except `equal_strict` and `exclude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldOptions {
    #[serde(default = "yes")]
    pub equal: bool,
    #[serde(default)]
    pub equal_strict: bool,
    #[serde(default = "yes")]
    pub exists: bool,
    #[serde(default = "yes", rename = "type")]
    pub type_op: bool,
    #[serde(default = "yes")]
    pub all: bool,
    #[serde(default = "yes")]
    pub size: bool,
    #[serde(default = "yes")]
    pub lte: bool,
    #[serde(default = "yes")]
    pub lt: bool,
    #[serde(default = "yes")]
    pub gte: bool,
    #[serde(default = "yes")]
    pub gt: bool,
    #[serde(default = "yes")]
    pub ne: bool,
    #[serde(default = "yes", rename = "in")]
    pub in_op: bool,
    #[serde(default = "yes")]
    pub nin: bool,
    #[serde(default = "yes")]
    pub text: bool,
    #[serde(default = "yes")]
    pub regex: bool,
    #[serde(default = "yes")]
    pub options: bool,
    #[serde(default = "yes")]
    pub geo_within: bool,
    #[serde(default = "yes")]
    pub geo_within_geometry: bool,
    #[serde(default)]
    pub exclude: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            equal: true,
            equal_strict: false,
            exists: true,
            type_op: true,
            all: true,
            size: true,
            lte: true,
            lt: true,
            gte: true,
            gt: true,
            ne: true,
            in_op: true,
            nin: true,
            text: true,
            regex: true,
            options: true,
            geo_within: true,
            geo_within_geometry: true,
            exclude: false,
        }
    }
}

/// One declared field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Dotted path relative to the schema declaring it.
    pub path: String,
    pub kind: FieldKind,
    pub options: FieldOptions,
    /// Any other per-field configuration carried by the declaration (`required`, `ref`, ...).
    pub extra: Map<String, Value>,
}

impl FieldDecl {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: FieldKind) -> Self {
        Self { path: path.into(), kind, options: FieldOptions::default(), extra: Map::new() }
    }

    #[must_use]
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

/// Direction or type of one key of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexDirection {
    Ascending,
    Descending,
    Text,
    Sphere2d,
    Other(String),
}

impl IndexDirection {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "text" => Self::Text,
            "2dsphere" => Self::Sphere2d,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSelector {
    Single(String),
    Compound(Vec<(String, IndexDirection)>),
}

impl IndexSelector {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        let (single, compound) = match self {
            Self::Single(p) => (Some(p.as_str()), None),
            Self::Compound(keys) => (None, Some(keys.iter().map(|(p, _)| p.as_str()))),
        };
        single.into_iter().chain(compound.into_iter().flatten())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDecl {
    pub selector: IndexSelector,
    pub options: IndexOptions,
}

impl IndexDecl {
    #[must_use]
    pub fn single(path: impl Into<String>, kind: Option<&str>) -> Self {
        Self {
            selector: IndexSelector::Single(path.into()),
            options: IndexOptions { kind: kind.map(str::to_string), extra: Map::new() },
        }
    }

    /// Same index re-rooted under `prefix` (used when lifting subdocument indexes).
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> Self {
        let selector = match &self.selector {
            IndexSelector::Single(p) => IndexSelector::Single(format!("{prefix}.{p}")),
            IndexSelector::Compound(keys) => IndexSelector::Compound(
                keys.iter().map(|(p, d)| (format!("{prefix}.{p}"), d.clone())).collect(),
            ),
        };
        Self { selector, options: self.options.clone() }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        if self.options.kind.as_deref() == Some("text") {
            return true;
        }
        matches!(&self.selector, IndexSelector::Compound(keys)
            if keys.iter().any(|(_, d)| *d == IndexDirection::Text))
    }

    /// Paths covered by a `2dsphere` index.
    #[must_use]
    pub fn geo_paths(&self) -> Vec<&str> {
        if self.options.kind.as_deref() == Some("2dsphere") {
            return self.selector.paths().collect();
        }
        match &self.selector {
            IndexSelector::Compound(keys) => keys
                .iter()
                .filter(|(_, d)| *d == IndexDirection::Sphere2d)
                .map(|(p, _)| p.as_str())
                .collect(),
            IndexSelector::Single(_) => Vec::new(),
        }
    }
}

/// The typed source schema: fields in declaration order plus declared indexes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSchema {
    pub fields: Vec<FieldDecl>,
    pub indexes: Vec<IndexDecl>,
}

impl SourceSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, decl: FieldDecl) -> Self {
        self.fields.push(decl);
        self
    }

    #[must_use]
    pub fn index(mut self, decl: IndexDecl) -> Self {
        self.indexes.push(decl);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(FieldKind::from_name("String"), FieldKind::String);
        assert_eq!(FieldKind::from_name("ObjectId"), FieldKind::Reference);
        assert_eq!(FieldKind::from_name("BOOL"), FieldKind::Boolean);
        assert_eq!(FieldKind::from_name("Buffer"), FieldKind::Unsupported("Buffer".into()));
    }

    #[test]
    fn date_and_reference_are_strings() {
        assert_eq!(FieldKind::Date.base_type(), Some(BaseType::String));
        assert_eq!(FieldKind::Reference.base_type(), Some(BaseType::String));
        assert_eq!(FieldKind::Mixed.base_type(), None);
    }

    #[test]
    fn innermost_unwraps_nested_arrays() {
        let k = FieldKind::ArrayOf(Box::new(FieldKind::ArrayOf(Box::new(FieldKind::Boolean))));
        assert_eq!(k.innermost(), &FieldKind::Boolean);
        assert_eq!(FieldKind::Date.innermost(), &FieldKind::Date);
    }

    #[test]
    fn compound_text_and_geo_detection() {
        let idx = IndexDecl {
            selector: IndexSelector::Compound(vec![
                ("name".into(), IndexDirection::Text),
                ("loc".into(), IndexDirection::Sphere2d),
                ("price".into(), IndexDirection::Ascending),
            ]),
            options: IndexOptions::default(),
        };
        assert!(idx.is_text());
        assert_eq!(idx.geo_paths(), vec!["loc"]);
    }

    #[test]
    fn options_kind_applies_to_every_selected_path() {
        let idx = IndexDecl::single("loc", Some("2dsphere"));
        assert!(!idx.is_text());
        assert_eq!(idx.geo_paths(), vec!["loc"]);
        assert!(IndexDecl::single("price", None).geo_paths().is_empty());
    }

    #[test]
    fn prefixed_reroots_every_key() {
        let idx = IndexDecl::single("loc", Some("2dsphere")).prefixed("places");
        assert_eq!(idx.geo_paths(), vec!["places.loc"]);
    }

    #[test]
    fn field_options_default_from_empty_object() {
        let o: FieldOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(o, FieldOptions::default());
        let o: FieldOptions = serde_json::from_str(r#"{"gte": false, "equalStrict": true, "in": false}"#).unwrap();
        assert!(!o.gte && o.equal_strict && !o.in_op && o.lte);
    }
}
