//! Client-held state: tokens round-trip, reset softly and never cross stores.

use serde_json::json;
use swapped_rust::result::{ActionOutcome, ResultPolicy};
use swapped_rust::{ServiceConfig, StateStore};

use crate::support::{fixture, fixture_with, htmx, protector, token, Browser};

#[test]
fn unchanged_state_issues_no_token() {
    let fx = fixture(12);
    let mut browser = Browser::htmx();

    let first = browser
        .send(&fx.service, "table.list", json!({ "table": "people" }))
        .unwrap();
    assert!(token(&first, "x-page-state").is_some());

    let second = browser
        .send(&fx.service, "table.list", json!({ "table": "people" }))
        .unwrap();
    assert!(second.tokens.is_empty());
    assert!(!second.body.contains("page-state"));
}

#[test]
fn state_survives_between_requests() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    browser
        .send(&fx.service, "table.sort", json!({ "table": "people", "column": "Age" }))
        .unwrap();
    browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 2 }))
        .unwrap();

    let mut store = StateStore::page(protector());
    store.load(browser.page.as_deref());
    let state: swapped_rust::TableState = store.get("Table", "people").unwrap().unwrap();
    assert_eq!(state.sort_column.as_deref(), Some("Age"));
    assert_eq!(state.page, 2);
}

#[test]
fn tampered_token_resets_to_defaults() {
    let fx = fixture(42);
    let headers = htmx().with("x-page-state", "bm90IGEgdG9rZW4");

    let rendered = fx
        .service
        .dispatch("table.page", json!({ "table": "people", "page": 2 }), headers)
        .unwrap();
    assert!(rendered.body.contains(r#"data-page="2""#));
    assert!(token(&rendered, "x-page-state").is_some());
}

#[test]
fn token_can_arrive_as_hidden_field_value() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();
    browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 4 }))
        .unwrap();
    let token = browser.page.clone().unwrap();

    let rendered = fx
        .service
        .dispatch("table.list", json!({ "table": "people", "page-state": token }), htmx())
        .unwrap();
    assert!(rendered.body.contains(">Person 31</tr>"));
    assert!(rendered.tokens.is_empty());
}

#[test]
fn global_store_is_separate() {
    let fx = fixture_with(3, ServiceConfig::default(), |service| {
        service.action("prefs.theme", ResultPolicy::content(), |ctx| {
            let theme: String = ctx.field("theme")?;
            ctx.global_mut().set("Prefs", "theme", &theme)?;
            Ok(ActionOutcome::empty())
        })
    });
    let mut browser = Browser::htmx();

    let rendered = browser
        .send(&fx.service, "prefs.theme", json!({ "theme": "dark" }))
        .unwrap();
    assert_eq!(rendered.tokens.len(), 1);
    assert!(token(&rendered, "x-global-state").is_some());
    assert_eq!(
        rendered.body,
        format!(
            r#"<template><input hx-swap-oob="outerHTML:#global-state" type="hidden" id="global-state" name="global-state" value="{}"></template>"#,
            browser.global.as_deref().unwrap()
        )
    );

    let mut page = StateStore::page(protector());
    assert_eq!(
        page.load(browser.global.as_deref()),
        swapped_rust::LoadOutcome::Reset
    );
    let mut global = StateStore::global(protector());
    global.load(browser.global.as_deref());
    assert_eq!(global.get::<String>("Prefs", "theme").unwrap().as_deref(), Some("dark"));
}

#[test]
fn page_token_sent_as_global_is_discarded() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();
    browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 3 }))
        .unwrap();

    let swapped = htmx().with("x-global-state", browser.page.clone().unwrap());
    let rendered = fx
        .service
        .dispatch("table.list", json!({ "table": "people" }), swapped)
        .unwrap();
    // Page store started empty; global store was reset but never written.
    assert!(rendered.body.contains(">Person 01</tr>"));
    assert!(token(&rendered, "x-global-state").is_none());
}
