//! Tests demonstrating the action module convention.
//!
//! Each action lives in its own module and exports:
//! - `ACTION: &str` - the action name
//! - `policy() -> ResultPolicy` - which fragments it produces
//! - `guard(ctx) -> bool` - input validation
//! - `handle(ctx) -> Result<ActionOutcome, HandlerError>` - the handler
//!
//! Registration uses the `register_actions!` macro.

use serde_json::json;
use swapped_rust::service::HandlerError;
use swapped_rust::ServiceConfig;

use crate::support::{fixture_with, htmx, key, Fixture};

mod actions {
    pub mod people_touch {
        use swapped_rust::result::{ActionOutcome, ResultPolicy};
        use swapped_rust::service::{Context, HandlerError};

        pub const ACTION: &str = "people.touch";

        pub fn policy() -> ResultPolicy {
            ResultPolicy::edit().with_table_page_fallback().unwrap()
        }

        pub fn guard(ctx: &Context<'_>) -> bool {
            ctx.has_fields(&["key"])
        }

        pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
            let key: String = ctx.field("key")?;
            Ok(ActionOutcome::rows("people", [key]))
        }
    }

    pub mod whoami {
        use serde_json::json;
        use swapped_rust::result::{ActionOutcome, ResultPolicy};
        use swapped_rust::service::{Context, HandlerError};

        pub const ACTION: &str = "whoami";

        pub fn policy() -> ResultPolicy {
            ResultPolicy::content()
        }

        pub fn guard(_ctx: &Context<'_>) -> bool {
            true
        }

        pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
            let user_id = ctx.user_id()?;
            Ok(ActionOutcome::view("Shared/AuthStatus", json!({ "user_id": user_id })))
        }
    }
}

fn service() -> Fixture {
    fixture_with(5, ServiceConfig::default(), |service| {
        swapped_rust::register_actions!(service, actions::people_touch, actions::whoami)
    })
}

#[test]
fn register_actions_and_dispatch() {
    let fx = service();

    let actions = fx.service.actions();
    assert!(actions.contains(&"people.touch"));
    assert!(actions.contains(&"whoami"));
    assert!(fx.service.policy("people.touch").is_some());

    let k = key(4);
    let rendered = fx
        .service
        .dispatch("people.touch", json!({ "key": k }), htmx())
        .unwrap();
    assert!(rendered
        .body
        .starts_with(&format!(r#"<template><tr hx-swap-oob="outerHTML:#people-row-{k}""#)));
    assert!(rendered.body.contains(">Person 04</tr>"));
}

#[test]
fn table_page_fallback_renders_page() {
    let fx = service();
    let rendered = fx
        .service
        .dispatch("people.touch", json!({ "key": key(1) }), Default::default())
        .unwrap();
    assert!(rendered.full_page);
    assert!(rendered.body.starts_with("<html>"));
}

#[test]
fn guard_rejects_bad_input() {
    let fx = service();
    let err = fx
        .service
        .dispatch("people.touch", json!({ "wrong": 1 }), htmx())
        .unwrap_err();
    assert!(matches!(err, HandlerError::GuardRejected(_)));
}

#[test]
fn handler_reads_request_identity() {
    let fx = service();

    let rendered = fx
        .service
        .dispatch("whoami", json!({}), htmx().with("x-user-id", "grace"))
        .unwrap();
    assert_eq!(rendered.body, r#"<span id="auth-status">grace</span>"#);

    let err = fx.service.dispatch("whoami", json!({}), htmx()).unwrap_err();
    assert!(matches!(err, HandlerError::Unauthorized(_)));
    assert_eq!(err.status_code(), 401);
}
