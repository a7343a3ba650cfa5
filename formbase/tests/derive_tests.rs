//! Tests for `#[derive(Record)]`: generated schema descriptors and the
//! typed conversions to and from field values.

use chrono::{DateTime, Utc};
use formbase::{
    codec, FieldDef, FieldValue, FieldValues, Record, Registry, Rel, ScalarKind, SchemaDef,
    SchemaError, Value,
};

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

#[derive(Record, Clone, Debug, PartialEq)]
#[record(table = "users")]
struct User {
    #[record(primary_key)]
    id: String,
    email: String,
}

#[derive(Record, Clone, Debug, PartialEq)]
#[record(table = "forms")]
struct Form {
    #[record(primary_key)]
    id: String,
    name: String,
    slug: String,
    active: bool,
    #[record(column = "owner_id")]
    owner: Rel<User>,
    closes_at: Option<DateTime<Utc>>,
    settings: serde_json::Value,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
struct PageWidget {
    kind: String,
    required: bool,
}

// `json` fields go through serde, so arbitrary types work as columns.
#[derive(Record, Clone, Debug, PartialEq)]
#[record(table = "pages")]
struct Page {
    #[record(primary_key)]
    id: String,
    #[record(json)]
    tags: Vec<String>,
    #[record(json)]
    widget: Option<PageWidget>,
}

// No table attribute: defaults to the snake_case struct name.
#[derive(Record, Clone, Debug, PartialEq, Default)]
struct AuditEntry {
    #[record(primary_key)]
    id: i64,
    payload: Vec<u8>,
    #[record(skip)]
    dirty: bool,
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register::<User>().unwrap();
    registry.register::<Form>().unwrap();
    registry.register::<AuditEntry>().unwrap();
    registry
}

#[test]
fn test_derived_schema_matches_annotations() {
    let expected = SchemaDef::new("Form", "forms")
        .field(FieldDef::scalar("id", ScalarKind::Text).primary_key())
        .field(FieldDef::scalar("name", ScalarKind::Text))
        .field(FieldDef::scalar("slug", ScalarKind::Text))
        .field(FieldDef::scalar("active", ScalarKind::Bool))
        .field(FieldDef::relation("owner", "User").column("owner_id"))
        .field(FieldDef::scalar("closes_at", ScalarKind::Timestamp))
        .field(FieldDef::scalar("settings", ScalarKind::Json));
    assert_eq!(Form::schema(), expected);
}

#[test]
fn test_default_table_name_is_snake_case() {
    assert_eq!(AuditEntry::schema().table, "audit_entry");
    assert_eq!(AuditEntry::TYPE_NAME, "AuditEntry");
}

#[test]
fn test_skip_field_not_in_schema() {
    let schema = AuditEntry::schema();
    assert!(schema.fields.iter().all(|f| f.name != "dirty"));
}

#[test]
fn test_to_values_unset_relation_omitted() {
    let form = Form {
        id: "f1".into(),
        name: "Signup".into(),
        slug: "signup".into(),
        active: true,
        owner: Rel::Unset,
        closes_at: None,
        settings: serde_json::json!({}),
    };
    let values = form.to_values().unwrap();
    assert!(!values.contains("owner"));
    // None becomes an explicit null, not an omission
    assert_eq!(
        values.get("closes_at"),
        Some(&FieldValue::Scalar(Value::Null))
    );
}

#[test]
fn test_round_trip_through_row_codec() {
    let registry = registry();
    let schema = registry.lookup("Form").unwrap();
    let form = Form {
        id: "f1".into(),
        name: "Signup".into(),
        slug: "signup".into(),
        active: true,
        owner: Rel::key("u1"),
        closes_at: Some(
            DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        ),
        settings: serde_json::json!({"public": true}),
    };

    let row = codec::encode_record(&registry, &form).unwrap();
    assert_eq!(row.get("owner_id"), Some(&Value::Text("u1".into())));

    let back: Form = codec::decode_record(schema, &row).unwrap();
    assert_eq!(back, form);
}

#[test]
fn test_nested_record_reduced_to_foreign_key_scalar() {
    let registry = registry();
    let form = Form {
        id: "f1".into(),
        name: "Signup".into(),
        slug: "signup".into(),
        active: true,
        owner: Rel::record(User {
            id: "X".into(),
            email: "x@example.com".into(),
        }),
        closes_at: None,
        settings: serde_json::json!(null),
    };

    let row = codec::encode_record(&registry, &form).unwrap();
    // The relation column holds the owner's primary key, never the record
    assert_eq!(row.get("owner_id"), Some(&Value::Text("X".into())));
    assert!(!row.contains("email"));
}

#[test]
fn test_json_attribute_declares_json_columns() {
    let expected = SchemaDef::new("Page", "pages")
        .field(FieldDef::scalar("id", ScalarKind::Text).primary_key())
        .field(FieldDef::scalar("tags", ScalarKind::Json))
        .field(FieldDef::scalar("widget", ScalarKind::Json));
    assert_eq!(Page::schema(), expected);
}

#[test]
fn test_json_fields_round_trip_through_serde() {
    let mut registry = Registry::new();
    registry.register::<Page>().unwrap();
    let schema = registry.lookup("Page").unwrap();
    let page = Page {
        id: "p1".into(),
        tags: vec!["intro".into(), "beta".into()],
        widget: Some(PageWidget {
            kind: "text".into(),
            required: true,
        }),
    };

    let row = codec::encode_record(&registry, &page).unwrap();
    assert_eq!(
        row.get("tags"),
        Some(&Value::Json(serde_json::json!(["intro", "beta"])))
    );

    let back: Page = codec::decode_record(schema, &row).unwrap();
    assert_eq!(back, page);
}

#[test]
fn test_json_none_encodes_as_null() {
    let page = Page {
        id: "p1".into(),
        tags: vec![],
        widget: None,
    };
    let values = page.to_values().unwrap();
    assert_eq!(values.get("widget"), Some(&FieldValue::Scalar(Value::Null)));
}

#[test]
fn test_json_field_decodes_from_text_storage() {
    let mut values = FieldValues::new();
    values.set_scalar("id", "p1");
    values.set_scalar("tags", Value::Text(r#"["a"]"#.into()));
    values.set_scalar("widget", Value::Null);

    let page = Page::from_values(values).unwrap();
    assert_eq!(page.tags, vec!["a".to_string()]);
    assert_eq!(page.widget, None);

    let mut bad = FieldValues::new();
    bad.set_scalar("id", "p1");
    bad.set_scalar("tags", Value::Text("not json".into()));
    assert_matches!(
        Page::from_values(bad),
        Err(SchemaError::InvalidJson { .. })
    );
}

#[test]
fn test_from_values_missing_required_field() {
    let mut values = FieldValues::new();
    values.set_scalar("id", "f1");
    assert_matches!(
        Form::from_values(values),
        Err(SchemaError::MissingField { ref field, .. }) if field == "name"
    );
}

#[test]
fn test_from_values_hydrates_nested_relation() {
    let mut owner = FieldValues::new();
    owner.set_scalar("id", "u1");
    owner.set_scalar("email", "o@example.com");

    let mut values = FieldValues::new();
    values.set_scalar("id", "f1");
    values.set_scalar("name", "Signup");
    values.set_scalar("slug", "signup");
    values.set_scalar("active", true);
    values.set("owner", FieldValue::Nested(owner));
    values.set_scalar("closes_at", Value::Null);
    values.set_scalar("settings", serde_json::json!({}));

    let form = Form::from_values(values).unwrap();
    assert_eq!(
        form.owner.as_record().map(|u| u.email.as_str()),
        Some("o@example.com")
    );
}

#[test]
fn test_skip_field_defaults_on_decode() {
    let mut values = FieldValues::new();
    values.set_scalar("id", 7i64);
    values.set_scalar("payload", Value::Blob(vec![1, 2, 3]));

    let entry = AuditEntry::from_values(values).unwrap();
    assert_eq!(entry.dirty, false);
    assert_eq!(entry.payload, vec![1, 2, 3]);
}
