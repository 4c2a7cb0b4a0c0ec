use crate::errors::SchemaError;
use crate::source::{FieldKind, FieldOptions, IndexDecl, SourceSchema};
use serde_json::Value;
use std::collections::HashMap;

use super::exclude::ExclusionPolicy;
use super::indexes;
use super::mapper::{Mode, TypeMapper};
use super::node::{Property, SchemaNode, join_path};
use super::GeneratedSchemas;

/// State carried across one build; nothing here outlives the call.
struct Walker<'a> {
    mapper: &'a TypeMapper,
    policy: &'a dyn ExclusionPolicy,
    /// Flattened dotted-path entries destined for the main query schema.
    aliases: Vec<(String, Value)>,
    options: HashMap<String, FieldOptions>,
    excluded: Vec<String>,
    /// Indexes declared inside subdocuments, re-rooted at the main schema.
    lifted_indexes: Vec<IndexDecl>,
}

fn split_last(path: &str) -> (&str, &str) {
    path.rsplit_once('.').unwrap_or(("", path))
}

fn first_segment(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

impl Walker<'_> {
    /// Emit every field of `source` under the node pair; returns the names emitted
    /// directly on these nodes, in declaration order.
    fn walk(
        &mut self,
        source: &SourceSchema,
        strict: &mut SchemaNode,
        query: &mut SchemaNode,
        nested: bool,
    ) -> Result<Vec<String>, SchemaError> {
        let mut emitted: Vec<String> = Vec::new();
        for decl in &source.fields {
            let full = join_path(strict.path(), &decl.path);
            if self.policy.exclude(&full, &decl.options) {
                log::debug!("excluded field {full}");
                self.excluded.push(full);
                continue;
            }
            let (_, field) = split_last(&decl.path);

            if let Some(sub) = decl.kind.subdocument_array() {
                let (parent_path, _) = split_last(&full);
                let mut child_strict = SchemaNode::child_of(parent_path, field);
                let mut child_query = SchemaNode::child_of(parent_path, field);
                self.lifted_indexes.extend(sub.indexes.iter().map(|i| i.prefixed(&full)));
                let required = self.walk(sub, &mut child_strict, &mut child_query, true)?;
                log::trace!("subdocument {full} requires {required:?}");
                child_strict.set_required(required);
                strict.resolve(&decl.path)?.insert(field, Property::ArrayOf(child_strict));
                query.resolve(&decl.path)?.insert(field, Property::Node(child_query));
            } else if let FieldKind::Subdocument(_) = decl.kind.innermost() {
                // bare, or wrapped in more than one array level
                return Err(SchemaError::SubdocumentNotArray(full));
            } else {
                let strict_frag = self.mapper.map_type(&decl.kind, &decl.options, Mode::Strict);
                let query_frag = self.mapper.map_type(&decl.kind, &decl.options, Mode::Query);
                let (Some(s), Some(q)) = (strict_frag, query_frag) else {
                    log::debug!("dropping field {full}: no schema for {:?}", decl.kind);
                    continue;
                };
                strict.resolve(&decl.path)?.insert(field, Property::Fragment(s));
                if nested {
                    self.aliases.push((full.clone(), q.clone()));
                }
                query.resolve(&decl.path)?.insert(field, Property::Fragment(q));
            }

            let top = first_segment(&decl.path);
            if !emitted.iter().any(|e| e == top) {
                emitted.push(top.to_string());
            }
            self.options.insert(full, decl.options.clone());
        }
        Ok(emitted)
    }
}

/// Build the strict and query schemas for `source` in one pass.
///
/// # Errors
/// Fatal declaration problems: a subdocument not declared as an array, or a path
/// that runs through a non-object field.
pub fn build(
    mapper: &TypeMapper,
    source: &SourceSchema,
    policy: &dyn ExclusionPolicy,
) -> Result<GeneratedSchemas, SchemaError> {
    let mut strict = SchemaNode::root();
    let mut query = SchemaNode::root();
    let mut walker = Walker {
        mapper,
        policy,
        aliases: Vec::new(),
        options: HashMap::new(),
        excluded: Vec::new(),
        lifted_indexes: Vec::new(),
    };
    walker.walk(source, &mut strict, &mut query, false)?;

    let Walker { aliases, options, excluded, lifted_indexes, .. } = walker;
    log::debug!("registering {} flattened aliases on main schema", aliases.len());
    for (path, frag) in aliases {
        query.insert(path, Property::Fragment(frag));
    }
    let declared: Vec<IndexDecl> = source.indexes.iter().cloned().chain(lifted_indexes).collect();
    indexes::postprocess(&mut query, &declared, &options, &excluded, mapper.injector())?;
    Ok(GeneratedSchemas { strict, query })
}
