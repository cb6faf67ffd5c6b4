//! Built-in table actions driving the query pipeline.

use std::sync::Arc;

use serde_json::json;
use swapped_rust::service::{HandlerError, RequestHeaders, Service};
use swapped_rust::table::TableError;
use swapped_rust::{Column, InMemorySource, ServiceConfig, TableDef, TableRegistry};

use crate::support::{fixture, key, people_table, protector, row_count, token, views, Browser};

#[test]
fn list_without_htmx_renders_full_page() {
    let fx = fixture(42);
    let mut browser = Browser::default();

    let rendered = browser
        .send(&fx.service, "table.list", json!({ "table": "people" }))
        .unwrap();

    assert!(rendered.full_page);
    assert!(rendered.body.starts_with("<html><body><table id=\"people-table\">"));
    assert_eq!(row_count(&rendered.body), 10);
    assert!(!rendered.body.contains("hx-swap-oob"));
    // First view stores the default state, so a token is issued as a header.
    assert!(browser.page.is_some());
}

#[test]
fn full_page_embeds_token_for_form_round_trip() {
    let fx = fixture(42);

    let first = Browser::default()
        .send(&fx.service, "table.sort", json!({ "table": "people", "column": "Name" }))
        .unwrap();
    assert!(first.full_page);
    let token = token(&first, "x-page-state").unwrap();
    assert!(first
        .body
        .contains(&format!(r#"<input type="hidden" id="page-state" name="page-state" value="{token}">"#)));

    // A plain form post sends the hidden field back instead of the header.
    let second = fx
        .service
        .dispatch(
            "table.sort",
            json!({ "table": "people", "column": "Name", "page-state": token }),
            RequestHeaders::new(),
        )
        .unwrap();
    let first_row = second.body.find("<tr ").unwrap();
    assert!(second.body[first_row..].starts_with(&format!(r#"<tr id="people-row-{}""#, key(42))));
}

#[test]
fn list_with_htmx_renders_table_and_token() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    let rendered = browser
        .send(&fx.service, "table.list", json!({ "table": "people" }))
        .unwrap();

    assert!(!rendered.full_page);
    assert!(rendered.body.starts_with("<table id=\"people-table\">"));
    assert!(rendered
        .body
        .ends_with("</template>"));
    assert!(rendered
        .body
        .contains(r#"<input hx-swap-oob="outerHTML:#page-state" type="hidden" id="page-state""#));
}

#[test]
fn sort_toggles_direction() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    let first = browser
        .send(&fx.service, "table.sort", json!({ "table": "people", "column": "Name" }))
        .unwrap();
    assert!(first.body.contains(r#"data-sort="Name:asc""#));
    assert!(first.body.contains(">Person 01</tr>"));

    let second = browser
        .send(&fx.service, "table.sort", json!({ "table": "people", "column": "Name" }))
        .unwrap();
    assert!(second.body.contains(r#"data-sort="Name:desc""#));
    let first_row = second.body.find("<tr ").unwrap();
    assert!(second.body[first_row..].contains(">Person 42</tr>"));
    assert!(!second.body.contains(">Person 01</tr>"));
}

#[test]
fn paging_fetches_the_last_partial_page() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    let rendered = browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 5 }))
        .unwrap();

    assert!(rendered.body.contains(r#"data-page="5" data-pages="5" data-total="42""#));
    assert_eq!(row_count(&rendered.body), 2);
    assert!(rendered.body.contains(">Person 41</tr>"));
}

#[test]
fn out_of_range_page_is_clamped_and_persisted() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    let rendered = browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 10 }))
        .unwrap();
    assert!(rendered.body.contains(r#"data-page="5""#));

    let again = browser
        .send(&fx.service, "table.list", json!({ "table": "people" }))
        .unwrap();
    assert!(again.body.contains(">Person 41</tr>"));
    // Nothing changed on the second request, so no new token.
    assert!(again.tokens.is_empty());
}

#[test]
fn page_size_change_returns_to_first_page() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 3 }))
        .unwrap();
    let rendered = browser
        .send(&fx.service, "table.page_size", json!({ "table": "people", "size": 20 }))
        .unwrap();

    assert!(rendered.body.contains(r#"data-page="1" data-pages="3""#));
    assert_eq!(row_count(&rendered.body), 20);
}

#[test]
fn paging_accepts_form_encoded_numbers() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    let rendered = browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": "2" }))
        .unwrap();
    assert!(rendered.body.contains(r#"data-page="2" data-pages="5""#));
    assert!(rendered.body.contains(">Person 11</tr>"));

    let resized = browser
        .send(&fx.service, "table.page_size", json!({ "table": "people", "size": "5" }))
        .unwrap();
    assert!(resized.body.contains(r#"data-page="1" data-pages="9""#));
    assert_eq!(row_count(&resized.body), 5);

    let err = browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": "last" }))
        .unwrap_err();
    assert!(matches!(err, HandlerError::DecodeFailed(_)));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn filter_narrows_rows_and_resets_page() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 3 }))
        .unwrap();
    let rendered = browser
        .send(
            &fx.service,
            "table.filter",
            json!({ "table": "people", "column": "Name", "value": "Person 1" }),
        )
        .unwrap();

    assert!(rendered.body.contains(r#"data-page="1" data-pages="1" data-total="10""#));
    assert_eq!(row_count(&rendered.body), 10);

    let cleared = browser
        .send(&fx.service, "table.filter", json!({ "table": "people", "column": "Name", "value": "" }))
        .unwrap();
    assert!(cleared.body.contains(r#"data-total="42""#));
}

#[test]
fn range_filter_is_inclusive() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    let rendered = browser
        .send(
            &fx.service,
            "table.range_filter",
            json!({ "table": "people", "column": "Age", "min": "30", "max": "34" }),
        )
        .unwrap();

    // Ages 20 + id % 50: ids 10..=14.
    assert!(rendered.body.contains(r#"data-total="5""#));

    let half_open = browser
        .send(
            &fx.service,
            "table.range_filter",
            json!({ "table": "people", "column": "Age", "min": "30" }),
        )
        .unwrap();
    assert!(half_open.body.contains(r#"data-total="42""#));
}

#[test]
fn clear_filters_restores_all_rows() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    browser
        .send(
            &fx.service,
            "table.filter",
            json!({ "table": "people", "column": "Name", "value": "Person 2" }),
        )
        .unwrap();
    let rendered = browser
        .send(&fx.service, "table.clear_filters", json!({ "table": "people" }))
        .unwrap();
    assert!(rendered.body.contains(r#"data-total="42""#));
}

#[test]
fn refresh_emits_every_table_part_in_order() {
    let fx = fixture(42);
    let mut browser = Browser::htmx();

    let body = browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 2 }))
        .unwrap()
        .body;

    let positions: Vec<usize> = [
        r#"hx-swap-oob="outerHTML:#people-body""#,
        r#"hx-swap-oob="outerHTML:#people-header""#,
        r#"hx-swap-oob="outerHTML:#people-pagination""#,
        r#"hx-swap-oob="outerHTML:#people-actions""#,
        r#"hx-swap-oob="outerHTML:#people-edit-toggle""#,
        r#"hx-swap-oob="outerHTML:#page-state""#,
    ]
    .iter()
    .map(|directive| body.find(directive).unwrap_or_else(|| panic!("missing {directive}")))
    .collect();

    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(body.starts_with("<template>"));
}

#[test]
fn empty_table_renders_empty_first_page() {
    let fx = fixture(0);
    let mut browser = Browser::htmx();

    let rendered = browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 3 }))
        .unwrap();
    assert!(rendered.body.contains(r#"data-page="1" data-pages="0" data-total="0""#));
    assert_eq!(row_count(&rendered.body), 0);
}

#[test]
fn unknown_column_is_rejected() {
    let fx = fixture(3);
    let err = Browser::htmx()
        .send(&fx.service, "table.sort", json!({ "table": "people", "column": "Salary" }))
        .unwrap_err();
    assert!(matches!(err, HandlerError::Table(TableError::UnknownColumn(ref c)) if c == "Salary"));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn unsortable_column_is_rejected_and_state_kept() {
    let fx = fixture(3);
    let mut browser = Browser::htmx();
    browser
        .send(&fx.service, "table.sort", json!({ "table": "people", "column": "Name" }))
        .unwrap();

    let err = browser
        .send(&fx.service, "table.sort", json!({ "table": "people", "column": "Id" }))
        .unwrap_err();
    assert!(matches!(err, HandlerError::Table(TableError::NotSortable(ref c)) if c == "Id"));
    assert_eq!(err.status_code(), 400);

    let rendered = browser
        .send(&fx.service, "table.page", json!({ "table": "people", "page": 1 }))
        .unwrap();
    assert!(rendered.body.contains(r#"data-sort="Name:asc""#));
}

#[test]
fn unknown_table_is_not_found() {
    let fx = fixture(3);
    let err = Browser::htmx()
        .send(&fx.service, "table.list", json!({ "table": "orders" }))
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn missing_table_field_fails_guard() {
    let fx = fixture(3);
    let err = Browser::htmx()
        .send(&fx.service, "table.sort", json!({ "column": "Name" }))
        .unwrap_err();
    assert!(matches!(err, HandlerError::GuardRejected(ref name) if name == "table.sort"));
}

#[test]
fn table_without_accessor_fails_at_registration() {
    let tables = TableRegistry::new()
        .register(people_table(InMemorySource::new(Vec::new())))
        .register(
            TableDef::new("tags", InMemorySource::new(vec!["a".to_string()]), |t: &String| t.clone())
                .column(Column::new("Actions")),
        );

    let result = Service::new(ServiceConfig::default(), protector(), Arc::new(views())).tables(tables);
    assert!(matches!(
        result,
        Err(TableError::NoValueAccessor { ref table }) if table == "tags"
    ));
}
