use crate::errors::SchemaError;
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Child of an object node.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// Nested object (an intermediate path segment or a subdocument).
    Node(SchemaNode),
    /// `{type: "array", items: <node>}` for arrays of subdocuments.
    ArrayOf(SchemaNode),
    /// Any other finished fragment.
    Fragment(Value),
}

impl Property {
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Node(n) => n.to_value(),
            Self::ArrayOf(n) => json!({ "type": "array", "items": n.to_value() }),
            Self::Fragment(v) => v.clone(),
        }
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&SchemaNode> {
        match self {
            Self::Node(n) | Self::ArrayOf(n) => Some(n),
            Self::Fragment(_) => None,
        }
    }
}

/// Object-shaped schema fragment: the document root or a subdocument.
///
/// Serializes with `additionalProperties: false`; `required` only when non-empty.
/// `path` and `field` are bookkeeping and never serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    path: String,
    field: Option<String>,
    properties: Vec<(String, Property)>,
    required: Vec<String>,
}

pub(crate) fn join_path(parent: &str, field: &str) -> String {
    if parent.is_empty() { field.to_string() } else { format!("{parent}.{field}") }
}

impl SchemaNode {
    /// The document root: empty path, no field.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn child_of(parent_path: &str, field: &str) -> Self {
        Self { path: join_path(parent_path, field), field: Some(field.to_string()), ..Self::default() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Insert or replace a property, keeping the position of a replaced key.
    pub fn insert(&mut self, name: impl Into<String>, prop: Property) {
        let name = name.into();
        match self.get_mut(&name) {
            Some(slot) => *slot = prop,
            None => self.properties.push((name, prop)),
        }
    }

    pub(crate) fn set_required(&mut self, names: Vec<String>) {
        self.required = names;
    }

    /// Walk to the node that will hold the last segment of `path`.
    ///
    /// # Errors
    /// See [`resolve`].
    pub fn resolve(&mut self, path: &str) -> Result<&mut Self, SchemaError> {
        resolve(Some(self), path)
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("object"));
        let props: Map<String, Value> =
            self.properties.iter().map(|(k, p)| (k.clone(), p.to_value())).collect();
        out.insert("properties".into(), Value::Object(props));
        if !self.required.is_empty() {
            out.insert("required".into(), json!(self.required));
        }
        out.insert("additionalProperties".into(), Value::Bool(false));
        Value::Object(out)
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Path tree builder.
///
/// Walks every segment of `path` except the last, creating object nodes for
/// missing intermediates and reusing nodes an earlier field already created.
/// Returns the parent of the final segment.
///
/// # Errors
/// `MissingRoot` without a root node; `PathConflict` when an intermediate segment
/// is already occupied by something other than an object node.
pub fn resolve<'a>(root: Option<&'a mut SchemaNode>, path: &str) -> Result<&'a mut SchemaNode, SchemaError> {
    let mut node = root.ok_or(SchemaError::MissingRoot)?;
    let mut parts: Vec<&str> = path.split('.').collect();
    parts.pop();
    for part in parts {
        if node.get(part).is_none() {
            let child = SchemaNode::child_of(&node.path, part);
            log::trace!("materialize intermediate node {}", child.path);
            node.properties.push((part.to_string(), Property::Node(child)));
        }
        let conflict = join_path(&node.path, part);
        node = match node.get_mut(part) {
            Some(Property::Node(n)) => n,
            _ => return Err(SchemaError::PathConflict(conflict)),
        };
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_without_root_fails() {
        assert!(matches!(resolve(None, "a.b"), Err(SchemaError::MissingRoot)));
    }

    #[test]
    fn resolve_single_segment_returns_root() {
        let mut root = SchemaNode::root();
        let parent = root.resolve("price").unwrap();
        assert_eq!(parent.path(), "");
        assert_eq!(parent.field(), None);
    }

    #[test]
    fn resolve_materializes_and_reuses_intermediates() {
        let mut root = SchemaNode::root();
        root.resolve("test.omg.name").unwrap().insert("name", Property::Fragment(json!({"type": "string"})));
        let parent = root.resolve("test.omg.hhh").unwrap();
        assert_eq!(parent.path(), "test.omg");
        assert_eq!(parent.field(), Some("omg"));
        parent.insert("hhh", Property::Fragment(json!({"type": "array"})));

        let test = root.get("test").and_then(Property::as_node).unwrap();
        assert_eq!(test.path(), "test");
        let omg = test.get("omg").and_then(Property::as_node).unwrap();
        assert_eq!(omg.properties().count(), 2);
    }

    #[test]
    fn resolve_through_leaf_conflicts() {
        let mut root = SchemaNode::root();
        root.insert("locc", Property::Fragment(json!({"type": "string"})));
        match root.resolve("locc.type") {
            Err(SchemaError::PathConflict(p)) => assert_eq!(p, "locc"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn node_serializes_closed_object() {
        let mut root = SchemaNode::root();
        root.resolve("a.b").unwrap().insert("b", Property::Fragment(json!({"type": "number"})));
        let v = serde_json::to_value(&root).unwrap();
        assert_eq!(v["additionalProperties"], json!(false));
        assert_eq!(v["properties"]["a"]["additionalProperties"], json!(false));
        assert_eq!(v["properties"]["a"]["properties"]["b"], json!({"type": "number"}));
        assert!(v.get("required").is_none());
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut n = SchemaNode::root();
        n.insert("a", Property::Fragment(json!(1)));
        n.insert("b", Property::Fragment(json!(2)));
        n.insert("a", Property::Fragment(json!(3)));
        let keys: Vec<&str> = n.properties().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(n.get("a"), Some(&Property::Fragment(json!(3))));
    }
}
