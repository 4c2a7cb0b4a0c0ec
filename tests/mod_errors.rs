use docquery_schema::errors::{Violation, Violations};
use docquery_schema::{SchemaError, SchemaNode};

#[test]
fn error_messages() {
    assert_eq!(SchemaError::MissingRoot.to_string(), "Missing root schema node");
    assert_eq!(
        SchemaError::PathConflict("price.amount".into()).to_string(),
        "Path conflict: price.amount is not an object node"
    );
    assert_eq!(
        SchemaError::SubdocumentNotArray("meta".into()).to_string(),
        "Subdocument must be declared as an array: meta"
    );
    assert_eq!(SchemaError::Config("x".into()).to_string(), "Config error: x");
}

#[test]
fn io_errors_convert() {
    let e: SchemaError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(e, SchemaError::Io(ref m) if m == "gone"));
}

#[test]
fn violations_render_one_per_line() {
    let v = Violations(vec![
        Violation { instance_path: String::new(), schema_path: "/required".into(), message: "missing".into() },
        Violation { instance_path: "/price".into(), schema_path: "/oneOf".into(), message: "bad".into() },
    ]);
    assert_eq!(v.to_string(), "  (root): missing\n  /price: bad");
    let e = SchemaError::ValidationFailed { violations: v };
    assert_eq!(e.to_string(), "Validation failed:\n  (root): missing\n  /price: bad");
}

#[test]
fn resolve_through_scalar_conflicts() {
    let src = docquery_schema::SourceSchema::from_json_str(
        r#"{"fields":[{"path":"price","type":"Number"},{"path":"price.amount","type":"Number"}]}"#,
    )
    .unwrap();
    match docquery_schema::generate(&src) {
        Err(SchemaError::PathConflict(p)) => assert_eq!(p, "price"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn resolve_without_root() {
    let e = docquery_schema::schema::resolve(None, "a.b").unwrap_err();
    assert!(matches!(e, SchemaError::MissingRoot));
    let mut root = SchemaNode::root();
    assert!(docquery_schema::schema::resolve(Some(&mut root), "a.b").is_ok());
}
