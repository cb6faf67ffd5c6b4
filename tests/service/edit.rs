//! Row edits: changed rows are re-rendered in place, deleted rows removed.

use serde_json::json;
use swapped_rust::service::HandlerError;

use crate::support::{fixture, key, row_count, Browser};

#[test]
fn update_rerenders_only_the_changed_row() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();
    let k = key(3);

    let rendered = browser
        .send(
            &fx.service,
            "table.update_row",
            json!({ "table": "people", "key": k, "values": { "name": "Grace", "age": 45 } }),
        )
        .unwrap();

    let directive = format!(r#"<tr hx-swap-oob="outerHTML:#people-row-{k}" id="people-row-{k}""#);
    assert!(rendered.body.contains(&directive));
    assert!(rendered.body.contains(">Grace</tr>"));
    assert_eq!(row_count(&rendered.body), 1);
    assert!(rendered.body.contains("#people-actions"));
    assert!(rendered.body.contains("#people-edit-toggle"));
    assert!(!rendered.body.contains("#people-body"));

    let stored = fx.source.find(|p| p.id == 3).unwrap().unwrap();
    assert_eq!(stored.name, "Grace");
    assert_eq!(stored.age, 45);
}

#[test]
fn delete_emits_delete_directive() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();
    let k = key(7);

    let rendered = browser
        .send(&fx.service, "table.delete_row", json!({ "table": "people", "key": k }))
        .unwrap();

    let expected = format!(
        r#"<template><div hx-swap-oob="delete:#people-row-{k}" id="people-row-{k}"></div></template>"#
    );
    assert!(rendered.body.starts_with(&expected));
    assert_eq!(fx.source.len().unwrap(), 41);
}

#[test]
fn deleting_a_missing_row_is_not_found() {
    let fx = fixture(3);
    let err = Browser::htmx()
        .send(&fx.service, "table.delete_row", json!({ "table": "people", "key": key(99) }))
        .unwrap_err();
    assert!(matches!(err, HandlerError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn malformed_key_is_a_bad_request() {
    let fx = fixture(3);
    let err = Browser::htmx()
        .send(&fx.service, "table.delete_row", json!({ "table": "people", "key": "%%%" }))
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn edit_mode_toggles_and_renders_rows_editable() {
    let fx = fixture(5);
    let mut browser = Browser::htmx();

    let on = browser
        .send(&fx.service, "table.edit_mode", json!({ "table": "people" }))
        .unwrap();
    assert!(on.body.contains(r#"id="people-edit-toggle" data-editing="true""#));
    assert!(on.body.contains(r#"data-editing="true">Person 01</tr>"#));

    let k = key(2);
    let updated = browser
        .send(
            &fx.service,
            "table.update_row",
            json!({ "table": "people", "key": k, "values": { "name": "Ada", "age": 36 } }),
        )
        .unwrap();
    assert!(updated.body.contains(r#"data-editing="true">Ada</tr>"#));

    let off = browser
        .send(&fx.service, "table.edit_mode", json!({ "table": "people" }))
        .unwrap();
    assert!(off.body.contains(r#"id="people-edit-toggle" data-editing="false""#));
}

#[test]
fn explicit_edit_mode_is_idempotent() {
    let fx = fixture(5);
    let mut browser = Browser::htmx();

    browser
        .send(&fx.service, "table.edit_mode", json!({ "table": "people", "editing": true }))
        .unwrap();
    let again = browser
        .send(&fx.service, "table.edit_mode", json!({ "table": "people", "editing": true }))
        .unwrap();
    assert!(again.body.contains(r#"data-editing="true""#));
    assert!(again.tokens.is_empty());
}

#[test]
fn edit_mode_accepts_text_flags() {
    let fx = fixture(5);
    let mut browser = Browser::htmx();

    let on = browser
        .send(&fx.service, "table.edit_mode", json!({ "table": "people", "editing": "true" }))
        .unwrap();
    assert!(on.body.contains(r#"id="people-edit-toggle" data-editing="true""#));

    // Explicit "false" sets the mode; it does not toggle.
    for _ in 0..2 {
        let off = browser
            .send(&fx.service, "table.edit_mode", json!({ "table": "people", "editing": "false" }))
            .unwrap();
        assert!(off.body.contains(r#"id="people-edit-toggle" data-editing="false""#));
    }
}

#[test]
fn create_refreshes_the_table() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    let rendered = browser
        .send(
            &fx.service,
            "table.create_row",
            json!({ "table": "people", "values": { "id": 43, "name": "Person 43", "age": 30 } }),
        )
        .unwrap();
    assert!(rendered.body.contains(r#"data-pages="5" data-total="43""#));
    assert!(rendered.body.contains("#people-body"));
}

#[test]
fn update_without_htmx_falls_back_to_table_page() {
    let fx = fixture(3);
    let mut browser = Browser::default();

    let rendered = browser
        .send(
            &fx.service,
            "table.update_row",
            json!({ "table": "people", "key": key(1), "values": { "name": "Linus", "age": 50 } }),
        )
        .unwrap();
    assert!(rendered.full_page);
    assert!(rendered.body.starts_with("<html>"));
    assert!(rendered.body.contains(">Linus</tr>"));
}
