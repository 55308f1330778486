//! Tests for the column catalog adapter and the authorized table.

use sqlgate::catalog::{allowed_columns, AuthorizedTable, ColumnMeta};
use sqlgate::GuardError;

fn zeec_catalog() -> Vec<ColumnMeta> {
    vec![
        ColumnMeta::new("zona", "text"),
        ColumnMeta::new("nomepan", "text"),
        ColumnMeta::new("pan", "text"),
        ColumnMeta::new("area_ha", "numeric"),
        ColumnMeta::geometry("geom"),
    ]
}

#[test]
fn test_whitelist_skips_geometry() {
    let wl = allowed_columns(&zeec_catalog());
    assert_eq!(wl.len(), 4);
    assert!(wl.contains("zona"));
    assert!(!wl.contains("geom"));
}

#[test]
fn test_whitelist_is_exact_match() {
    let wl = allowed_columns(&zeec_catalog());
    assert!(!wl.contains("ZONA"));
    assert!(!wl.contains("zona "));
    assert!(!wl.contains("\"zona\""));
}

#[test]
fn test_whitelist_keeps_catalog_order() {
    let wl = allowed_columns(&zeec_catalog());
    let names: Vec<&str> = wl.iter().collect();
    assert_eq!(names, vec!["zona", "nomepan", "pan", "area_ha"]);
    assert_eq!(wl.longest_first()[0], "nomepan");
}

#[test]
fn test_catalog_from_json() {
    let json = r#"[
        {"name": "zona", "type": "text"},
        {"name": "geom", "type": "geometry", "is_geometry": true},
        {"name": "area_ha"}
    ]"#;
    let catalog: Vec<ColumnMeta> = serde_json::from_str(json).unwrap();
    let wl = allowed_columns(&catalog);
    assert_eq!(wl.iter().collect::<Vec<_>>(), vec!["zona", "area_ha"]);
}

#[test]
fn test_empty_catalog() {
    assert!(allowed_columns(&[]).is_empty());
}

#[test]
fn test_authorized_table_qualification() {
    let t = AuthorizedTable::from_identifier("correct_table", "zcm").unwrap();
    assert_eq!(t.as_str(), "zcm.\"correct_table\"");
    assert_eq!(t.to_string(), "zcm.\"correct_table\"");
    assert_eq!(
        t.split_schema().unwrap(),
        ("zcm".to_string(), "correct_table".to_string())
    );
}

#[test]
fn test_authorized_table_rejects_injection() {
    assert!(matches!(
        AuthorizedTable::new("t; DROP TABLE x"),
        Err(GuardError::InvalidTableReference(_))
    ));
    assert!(matches!(
        AuthorizedTable::from_identifier("   ", "zcm"),
        Err(GuardError::InvalidTableReference(_))
    ));
}
