use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use super::types::{
    FieldDecl, FieldKind, FieldOptions, IndexDecl, IndexDirection, IndexOptions, IndexSelector,
    SourceSchema,
};

// Serde-facing structures for declarations; converted into the typed schema via TryFrom.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDeclSerde {
    #[serde(default)]
    pub fields: Vec<FieldDeclSerde>,
    #[serde(default)]
    pub indexes: Vec<IndexDeclSerde>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDeclSerde {
    pub path: String,
    #[serde(default, rename = "type")]
    pub kind: Option<TypeDeclSerde>,
    #[serde(default)]
    pub search: Option<FieldOptions>,
    #[serde(default)]
    pub index: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDeclSerde {
    Flag(bool),
    Name(String),
    Array(Vec<TypeDeclSerde>),
    Element {
        #[serde(rename = "type")]
        kind: Box<TypeDeclSerde>,
        #[serde(default)]
        search: Option<FieldOptions>,
    },
    Nested(Box<NestedDeclSerde>),
}

/// Subdocument declaration used as a type. Unlike the top-level declaration it must
/// name its `fields`, so a malformed element never degrades into an empty subdocument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NestedDeclSerde {
    pub fields: Vec<FieldDeclSerde>,
    #[serde(default)]
    pub indexes: Vec<IndexDeclSerde>,
}

impl From<NestedDeclSerde> for SchemaDeclSerde {
    fn from(n: NestedDeclSerde) -> Self {
        Self { fields: n.fields, indexes: n.indexes }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDeclSerde {
    pub fields: Value,
    #[serde(default)]
    pub options: IndexOptions,
}

/// Resolve a declared type; the second value is the element-level `search` block, if any.
fn resolve_type(decl: TypeDeclSerde) -> Result<(FieldKind, Option<FieldOptions>), SchemaError> {
    use TypeDeclSerde as TD;
    Ok(match decl {
        TD::Flag(false) => (FieldKind::Disabled, None),
        TD::Flag(true) => (FieldKind::Mixed, None),
        TD::Name(name) => (FieldKind::from_name(&name), None),
        TD::Array(items) => {
            let mut items = items.into_iter();
            let (inner, opts) = match items.next() {
                Some(first) => resolve_type(first)?,
                None => (FieldKind::Mixed, None),
            };
            if items.next().is_some() {
                return Err(SchemaError::InvalidDeclaration(
                    "array type must declare at most one element type".into(),
                ));
            }
            (FieldKind::ArrayOf(Box::new(inner)), opts)
        }
        TD::Element { kind, search } => {
            let (inner, nested_opts) = resolve_type(*kind)?;
            (inner, search.or(nested_opts))
        }
        TD::Nested(schema) => {
            let decl = SchemaDeclSerde::from(*schema);
            (FieldKind::Subdocument(Box::new(SourceSchema::try_from(decl)?)), None)
        }
    })
}

/// Dotted paths need at least one segment and no empty ones.
fn check_path(what: &str, path: &str) -> Result<(), SchemaError> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(SchemaError::InvalidDeclaration(format!("bad {what} path {path:?}")));
    }
    Ok(())
}

fn parse_direction(path: &str, v: &Value) -> Result<IndexDirection, SchemaError> {
    match v {
        Value::Number(n) if n.as_i64() == Some(1) => Ok(IndexDirection::Ascending),
        Value::Number(n) if n.as_i64() == Some(-1) => Ok(IndexDirection::Descending),
        Value::String(s) => Ok(IndexDirection::from_name(s)),
        other => Err(SchemaError::InvalidDeclaration(format!(
            "index direction for {path} must be 1, -1 or a string, got {other}"
        ))),
    }
}

impl TryFrom<IndexDeclSerde> for IndexDecl {
    type Error = SchemaError;
    fn try_from(is: IndexDeclSerde) -> Result<Self, Self::Error> {
        let selector = match is.fields {
            Value::String(path) => {
                check_path("index", &path)?;
                IndexSelector::Single(path)
            }
            Value::Object(keys) if !keys.is_empty() => IndexSelector::Compound(
                keys.iter()
                    .map(|(p, d)| {
                        check_path("index", p)?;
                        Ok((p.clone(), parse_direction(p, d)?))
                    })
                    .collect::<Result<_, SchemaError>>()?,
            ),
            other => {
                return Err(SchemaError::InvalidDeclaration(format!(
                    "index fields must be a path or a non-empty mapping, got {other}"
                )));
            }
        };
        Ok(Self { selector, options: is.options })
    }
}

/// Promote a field-level `index` shorthand into an index declaration.
fn field_index(path: &str, v: &Value) -> Result<Option<IndexDecl>, SchemaError> {
    Ok(match v {
        Value::Bool(false) | Value::Null => None,
        Value::Bool(true) | Value::Number(_) => Some(IndexDecl::single(path, None)),
        Value::String(kind) => Some(IndexDecl::single(path, Some(kind))),
        Value::Object(_) => {
            let options: IndexOptions = serde_json::from_value(v.clone())?;
            Some(IndexDecl { selector: IndexSelector::Single(path.to_string()), options })
        }
        Value::Array(_) => {
            return Err(SchemaError::InvalidDeclaration(format!("index on {path} cannot be an array")));
        }
    })
}

impl TryFrom<SchemaDeclSerde> for SourceSchema {
    type Error = SchemaError;
    fn try_from(ds: SchemaDeclSerde) -> Result<Self, Self::Error> {
        let mut out = Self::default();
        for fd in ds.fields {
            check_path("field", &fd.path)?;
            if let Some(idx) = fd.index.as_ref().map(|v| field_index(&fd.path, v)).transpose()?.flatten() {
                out.indexes.push(idx);
            }
            let (kind, element_opts) = match fd.kind {
                Some(t) => resolve_type(t)?,
                None => (FieldKind::Mixed, None),
            };
            let options = element_opts.or(fd.search).unwrap_or_default();
            out.fields.push(FieldDecl { path: fd.path, kind, options, extra: fd.extra });
        }
        for is in ds.indexes {
            out.indexes.push(IndexDecl::try_from(is)?);
        }
        Ok(out)
    }
}

impl SourceSchema {
    /// # Errors
    /// Returns an error if the JSON is malformed or the declaration is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let ds: SchemaDeclSerde = serde_json::from_str(json)?;
        Self::try_from(ds)
    }

    /// # Errors
    /// Returns an error if the value does not describe a valid declaration.
    pub fn from_json_value(value: Value) -> Result<Self, SchemaError> {
        let ds: SchemaDeclSerde = serde_json::from_value(value)?;
        Self::try_from(ds)
    }

    /// # Errors
    /// Returns an error if the TOML is malformed or the declaration is invalid.
    pub fn from_toml_str(s: &str) -> Result<Self, SchemaError> {
        let ds: SchemaDeclSerde = toml::from_str(s)?;
        Self::try_from(ds)
    }

    /// Ingest a declaration stored as a BSON document (via relaxed extended JSON).
    ///
    /// # Errors
    /// Returns an error if the converted document is not a valid declaration.
    pub fn from_bson_document(doc: &bson::Document) -> Result<Self, SchemaError> {
        let value = bson::Bson::Document(doc.clone()).into_relaxed_extjson();
        Self::from_json_value(value)
    }

    /// Load a declaration file; `.toml` files are TOML, everything else JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(format!("{}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&s),
            _ => Self::from_json_str(&s),
        }
    }
}
