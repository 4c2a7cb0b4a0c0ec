use crate::errors::SchemaError;
use crate::source::{FieldOptions, IndexDecl};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};

use super::node::{Property, SchemaNode};
use super::operators::OperatorInjector;

fn is_excluded(path: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|e| path == e || path.strip_prefix(e.as_str()).is_some_and(|r| r.starts_with('.')))
}

/// Replace `key` on `node` with `{oneOf: [geo, previous]}`, or `{oneOf: [geo]}`.
///
/// An unconstrained previous fragment (`{}`) would match every geo query too and make
/// the `oneOf` unsatisfiable, so it is treated as absent.
fn wrap_geo(node: &mut SchemaNode, key: &str, geo: &Value) {
    let alternatives = match node.get(key).map(Property::to_value) {
        Some(prev) if prev != json!({}) => vec![geo.clone(), prev],
        _ => vec![geo.clone()],
    };
    node.insert(key, Property::Fragment(json!({ "oneOf": alternatives })));
}

/// Index-aware rewrite of the finished query root. Runs once per build.
///
/// A text index anywhere adds the global `$text` operator; each `2dsphere` path is
/// rewritten to accept either a geo query or its normal query fragment.
pub(crate) fn postprocess(
    root: &mut SchemaNode,
    declared: &[IndexDecl],
    options: &HashMap<String, FieldOptions>,
    excluded: &[String],
    injector: &OperatorInjector,
) -> Result<(), SchemaError> {
    if declared.iter().any(IndexDecl::is_text) {
        log::debug!("text index declared; adding global $text");
        root.insert("$text", Property::Fragment(injector.text_argument()));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for path in declared.iter().flat_map(IndexDecl::geo_paths) {
        if !seen.insert(path) || is_excluded(path, excluded) {
            continue;
        }
        let field_options = options.get(path).cloned().unwrap_or_default();
        let Some(geo) = injector.geo(&field_options).into_fragment() else {
            log::debug!("geo operators disabled on {path}; leaving fragment untouched");
            continue;
        };
        if path.contains('.') && root.get(path).is_some() {
            wrap_geo(root, path, &geo);
        }
        let field = path.rsplit('.').next().unwrap_or(path);
        wrap_geo(root.resolve(path)?, field, &geo);
        log::trace!("2dsphere rewrite at {path}");
    }
    Ok(())
}
