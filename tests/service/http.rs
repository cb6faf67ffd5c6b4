//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use serde_json::json;
use swapped_rust::service::{self, Service};

use crate::support::fixture;

/// Bind to port 0 and return the actual address.
async fn start_server(service: Service) -> String {
    let app = service::router(Arc::new(service));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_check() {
    let base = start_server(fixture(3).service).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    let actions = body["actions"].as_array().unwrap();
    assert!(actions.iter().any(|a| a == "table.sort"));
    assert_eq!(body["tables"], json!(["people"]));
}

#[tokio::test]
async fn fragment_request_returns_html_and_token_header() {
    let base = start_server(fixture(42).service).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/table.sort"))
        .header("HX-Request", "true")
        .json(&json!({ "table": "people", "column": "Name" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "text/html; charset=utf-8"
    );
    let token = resp.headers()["x-page-state"].to_str().unwrap().to_string();
    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"data-sort="Name:asc""#));
    assert!(body.contains(&format!(r#"value="{token}""#)));

    // Send the token back: the same column sorts descending.
    let resp = client
        .post(format!("{base}/table.sort"))
        .header("HX-Request", "true")
        .header("X-Page-State", token)
        .json(&json!({ "table": "people", "column": "Name" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"data-sort="Name:desc""#));
}

#[tokio::test]
async fn get_renders_full_page_from_query() {
    let base = start_server(fixture(12).service).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/table.list?table=people"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-page-state"));
    let body = resp.text().await.unwrap();
    assert!(body.starts_with("<html>"));
    assert!(!body.contains("hx-swap-oob"));
}

#[tokio::test]
async fn get_query_values_decode_as_numbers_and_flags() {
    let base = start_server(fixture(42).service).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/table.page?table=people&page=2"))
        .header("HX-Request", "true")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let token = resp.headers()["x-page-state"].to_str().unwrap().to_string();
    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"data-page="2""#));

    let resp = client
        .get(format!("{base}/table.edit_mode?table=people&editing=false"))
        .header("HX-Request", "true")
        .header("X-Page-State", token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"data-editing="false""#));
}

#[tokio::test]
async fn empty_body_is_empty_input() {
    let base = start_server(fixture(3).service).await;
    let client = reqwest::Client::new();

    // No `table` field, so the guard rejects it.
    let resp = client
        .post(format!("{base}/table.list"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let base = start_server(fixture(3).service).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/table.list"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn unknown_command_returns_404() {
    let base = start_server(fixture(3).service).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/nonexistent"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn unknown_table_returns_404() {
    let base = start_server(fixture(3).service).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/table.list"))
        .header("HX-Request", "true")
        .json(&json!({ "table": "orders" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
