use docquery_schema::source::{IndexDirection, IndexSelector};
use docquery_schema::{FieldKind, SchemaError, SourceSchema};
use std::path::Path;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn listing_fixture_loads_from_disk() {
    let src = SourceSchema::load(&fixture("listing.json")).unwrap();
    assert_eq!(src.fields.len(), 18);
    // locc from the indexes block, name and price promoted from field shorthands
    assert_eq!(src.indexes.len(), 3);

    let thumb = src.fields.iter().find(|f| f.path == "thumbnail").unwrap();
    assert_eq!(thumb.kind, FieldKind::Unsupported("Buffer".into()));
    let password = src.fields.iter().find(|f| f.path == "password").unwrap();
    assert!(password.options.exclude);
    let cats = src.fields.iter().find(|f| f.path == "categories").unwrap();
    assert_eq!(cats.kind, FieldKind::ArrayOf(Box::new(FieldKind::Reference)));
    let meta = src.fields.iter().find(|f| f.path == "metadata").unwrap();
    let nested = meta.kind.subdocument_array().unwrap();
    assert_eq!(nested.indexes.len(), 1);
}

#[test]
fn toml_declaration_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("decl.toml");
    std::fs::write(
        &p,
        r#"
[[fields]]
path = "title"
type = "String"
index = "text"

[[fields]]
path = "rank"
type = "Number"

[[indexes]]
fields = { title = "text", rank = -1 }
"#,
    )
    .unwrap();
    let src = SourceSchema::load(&p).unwrap();
    assert_eq!(src.fields.len(), 2);
    assert_eq!(src.indexes.len(), 2);
    match &src.indexes[1].selector {
        IndexSelector::Compound(keys) => {
            let dir = |p: &str| keys.iter().find(|(k, _)| k == p).map(|(_, d)| d.clone());
            assert_eq!(dir("title"), Some(IndexDirection::Text));
            assert_eq!(dir("rank"), Some(IndexDirection::Descending));
        }
        other => panic!("unexpected selector {other:?}"),
    }
}

#[test]
fn bson_declaration_builds() {
    let doc = bson::doc! {
        "fields": [
            { "path": "loc.type", "type": "String" },
            { "path": "loc.coordinates", "type": [] },
        ],
        "indexes": [ { "fields": "loc", "options": { "type": "2dsphere" } } ],
    };
    let src = SourceSchema::from_bson_document(&doc).unwrap();
    let out = docquery_schema::generate(&src).unwrap();
    let q = out.query_value();
    assert!(q["properties"]["loc"]["oneOf"].is_array());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let e = SourceSchema::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(e, SchemaError::Io(_)));
}

#[test]
fn malformed_files_report_their_format() {
    let dir = tempfile::tempdir().unwrap();
    let j = dir.path().join("bad.json");
    std::fs::write(&j, "{ fields: ").unwrap();
    assert!(matches!(SourceSchema::load(&j), Err(SchemaError::Json(_))));
    let t = dir.path().join("bad.toml");
    std::fs::write(&t, "[[fields]\npath = ").unwrap();
    assert!(matches!(SourceSchema::load(&t), Err(SchemaError::Toml(_))));
}
