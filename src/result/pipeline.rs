//! ResultPipeline - turns a handler outcome into a response body.
//!
//! For fragment-capable requests the action's [`ResultKind`] decides which
//! out-of-band fragments accompany the handler's main view. Otherwise the
//! policy's fallback view is rendered as a full page. Either way, every
//! state store that changed during the request is re-issued as a response
//! header. Fragment responses also carry a hidden-field fragment per token;
//! full pages expose them to the page view under `state_tokens`, keyed by
//! hidden-field element id.

use serde_json::{json, Value};

use crate::config::ServiceConfig;
use crate::fragment::{Disposition, Fragment, SwapComposer, STATE_TOKEN_COMPONENT, TOMBSTONE_COMPONENT};
use crate::service::RequestHeaders;
use crate::state::{StateError, StateStore};
use crate::table::{editing_key, row_dom_id, TableElementIds, TableHandler, TableRegistry, TableState, TABLE_PARTITION};

use super::error::ResultError;
use super::kind::{ActionOutcome, Fallback, ResultKind, ResultPolicy};
use super::navigation::NavigationProvider;

/// Model field holding re-issued state tokens on full-page renders.
pub const STATE_TOKENS_FIELD: &str = "state_tokens";

/// A composed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    /// True when the body is a full page rather than a fragment set.
    pub full_page: bool,
    /// `(header name, token)` for every store that changed.
    pub tokens: Vec<(String, String)>,
}

/// Table state stored for `handler`, or its default when none is stored yet.
pub fn stored_table_state(page: &StateStore, handler: &dyn TableHandler) -> Result<TableState, StateError> {
    Ok(page
        .get(TABLE_PARTITION, handler.type_id())?
        .unwrap_or_else(|| handler.default_state()))
}

/// Whether the table is in edit mode.
pub fn stored_editing(page: &StateStore, type_id: &str) -> Result<bool, StateError> {
    page.get_or_default(TABLE_PARTITION, &editing_key(type_id))
}

pub struct ResultPipeline<'a> {
    config: &'a ServiceConfig,
    tables: &'a TableRegistry,
    navigation: &'a dyn NavigationProvider,
    composer: &'a SwapComposer,
}

impl<'a> ResultPipeline<'a> {
    pub fn new(
        config: &'a ServiceConfig,
        tables: &'a TableRegistry,
        navigation: &'a dyn NavigationProvider,
        composer: &'a SwapComposer,
    ) -> Self {
        Self {
            config,
            tables,
            navigation,
            composer,
        }
    }

    pub fn run(
        &self,
        policy: &ResultPolicy,
        outcome: ActionOutcome,
        request: &RequestHeaders,
        page: &mut StateStore,
        global: &mut StateStore,
    ) -> Result<Rendered, ResultError> {
        let kind = policy.kind();
        let handler = match &outcome.table {
            Some(type_id) => Some(self.tables.get(type_id)?),
            None => None,
        };
        let mut table = TableView::new(kind, handler.as_deref());

        if !request.is_fragment_request(&self.config.fragment_request_header) {
            let (body, issued) = self.full_page(policy, outcome, &mut table, page, global)?;
            return Ok(Rendered {
                body,
                full_page: true,
                tokens: issued.into_iter().map(IssuedToken::into_header).collect(),
            });
        }

        let main = match &outcome.view {
            Some(view) => {
                let model = if outcome.model.is_null() && table.is_some() {
                    table.model(page)?.clone()
                } else {
                    outcome.model.clone()
                };
                Some(Fragment::main(view.clone(), model))
            }
            None => None,
        };

        let mut oobs = Vec::new();
        match kind {
            ResultKind::Content => {}
            ResultKind::Edit => {
                let handler = table.handler().ok_or(ResultError::MissingTable { kind })?;
                let editing = stored_editing(page, handler.type_id())?;
                for key in &outcome.changed_rows {
                    oobs.push(row_fragment(handler, key, editing)?);
                }
                let ids = TableElementIds::for_type(handler.type_id());
                let views = handler.views().clone();
                let model = table.model(page)?;
                oobs.push(part(&views.action_list, model, &ids.action_list));
                oobs.push(part(&views.edit_toggle, model, &ids.edit_toggle));
            }
            ResultKind::Refresh => {
                let handler = table.handler().ok_or(ResultError::MissingTable { kind })?;
                let ids = TableElementIds::for_type(handler.type_id());
                let views = handler.views().clone();
                let model = table.model(page)?;
                oobs.push(part(&views.body, model, &ids.body));
                oobs.push(part(&views.header, model, &ids.header));
                oobs.push(part(&views.pagination, model, &ids.pagination));
                oobs.push(part(&views.action_list, model, &ids.action_list));
                oobs.push(part(&views.edit_toggle, model, &ids.edit_toggle));
            }
            ResultKind::Nav => {
                oobs.push(self.navigation_fragment(request)?);
            }
            ResultKind::AuthStatus => {
                oobs.push(self.navigation_fragment(request)?);
                oobs.push(
                    Fragment::oob(
                        self.config.auth_status_view.clone(),
                        self.navigation.auth_status(request),
                        Disposition::OuterHtml,
                    )
                    .target(self.config.auth_status_target.clone()),
                );
            }
        }

        let issued = self.issue_tokens(page, global)?;
        for token in &issued {
            oobs.push(
                Fragment::oob(
                    STATE_TOKEN_COMPONENT,
                    json!({ "id": token.element, "token": token.token }),
                    Disposition::OuterHtml,
                )
                .target(format!("#{}", token.element)),
            );
        }

        let body = self.composer.compose(main.as_ref(), &oobs)?;
        tracing::debug!(%kind, oob = oobs.len(), tokens = issued.len(), "fragment result composed");
        Ok(Rendered {
            body,
            full_page: false,
            tokens: issued.into_iter().map(IssuedToken::into_header).collect(),
        })
    }

    fn full_page(
        &self,
        policy: &ResultPolicy,
        outcome: ActionOutcome,
        table: &mut TableView<'_>,
        page: &mut StateStore,
        global: &StateStore,
    ) -> Result<(String, Vec<IssuedToken>), ResultError> {
        let kind = policy.kind();
        if !kind.supports_fallback() {
            return Err(ResultError::FallbackNotSupported { kind });
        }
        let view = match policy.fallback() {
            Fallback::View(view) => view.clone(),
            Fallback::TablePage => table
                .handler()
                .ok_or(ResultError::MissingTable { kind })?
                .views()
                .page
                .clone(),
            Fallback::None => match (kind, outcome.view) {
                (ResultKind::Content, Some(view)) => view,
                (ResultKind::Content, None) => return Err(ResultError::MissingView { kind }),
                _ => return Err(ResultError::FragmentOnly { kind }),
            },
        };
        let mut model = if outcome.model.is_null() && table.is_some() {
            table.model(page)?.clone()
        } else {
            outcome.model
        };

        // Sealed after the model fetch, which may write a clamped page back.
        let issued = self.issue_tokens(page, global)?;
        if model.is_null() {
            model = json!({});
        }
        if let Value::Object(fields) = &mut model {
            let tokens: serde_json::Map<String, Value> = issued
                .iter()
                .map(|t| (t.element.clone(), Value::String(t.token.clone())))
                .collect();
            fields.insert(STATE_TOKENS_FIELD.to_string(), Value::Object(tokens));
        }

        tracing::debug!(%kind, %view, tokens = issued.len(), "rendering full-page fallback");
        let body = self.composer.compose(Some(&Fragment::main(view, model)), &[])?;
        Ok((body, issued))
    }

    fn navigation_fragment(&self, request: &RequestHeaders) -> Result<Fragment, ResultError> {
        let nodes = self
            .navigation
            .navigation(request)
            .map_err(|e| ResultError::Navigation(e.to_string()))?;
        Ok(Fragment::oob(
            self.config.navigation_view.clone(),
            json!({ "items": nodes }),
            Disposition::OuterHtml,
        )
        .target(self.config.navigation_target.clone()))
    }

    /// Seal every store that changed, page first.
    fn issue_tokens(&self, page: &StateStore, global: &StateStore) -> Result<Vec<IssuedToken>, ResultError> {
        let stores = [
            (page, &self.config.page_state_header, &self.config.page_state_element),
            (global, &self.config.global_state_header, &self.config.global_state_element),
        ];
        let mut issued = Vec::new();
        for (store, header, element) in stores {
            if store.is_dirty() {
                issued.push(IssuedToken {
                    header: header.clone(),
                    element: element.clone(),
                    token: store.encrypted()?,
                });
            }
        }
        Ok(issued)
    }
}

struct IssuedToken {
    header: String,
    element: String,
    token: String,
}

impl IssuedToken {
    fn into_header(self) -> (String, String) {
        (self.header, self.token)
    }
}

/// A table's view model, fetched at most once per response.
struct TableView<'h> {
    kind: ResultKind,
    handler: Option<&'h dyn TableHandler>,
    model: Option<Value>,
}

impl<'h> TableView<'h> {
    fn new(kind: ResultKind, handler: Option<&'h dyn TableHandler>) -> Self {
        Self {
            kind,
            handler,
            model: None,
        }
    }

    fn is_some(&self) -> bool {
        self.handler.is_some()
    }

    fn handler(&self) -> Option<&'h dyn TableHandler> {
        self.handler
    }

    /// The page's view model, fetched on first use and cached.
    fn model(&mut self, page: &mut StateStore) -> Result<&Value, ResultError> {
        let model = match self.model.take() {
            Some(model) => model,
            None => self.fetch(page)?,
        };
        Ok(self.model.insert(model))
    }

    /// Render the current page. A page clamped past the end is written back.
    fn fetch(&self, page: &mut StateStore) -> Result<Value, ResultError> {
        let handler = self
            .handler
            .ok_or(ResultError::MissingTable { kind: self.kind })?;
        let stored: Option<TableState> = page.get(TABLE_PARTITION, handler.type_id())?;
        let mut state = stored.clone().unwrap_or_else(|| handler.default_state());
        let editing = stored_editing(page, handler.type_id())?;
        let model = handler.render_model(&mut state, editing)?;
        if stored.as_ref() != Some(&state) {
            page.set(TABLE_PARTITION, handler.type_id(), &state)?;
        }
        Ok(model)
    }
}

fn part(view: &str, model: &Value, element_id: &str) -> Fragment {
    Fragment::oob(view, model.clone(), Disposition::OuterHtml).target(format!("#{}", element_id))
}

/// Re-render a changed row, or remove it if it no longer exists.
fn row_fragment(handler: &dyn TableHandler, key: &str, editing: bool) -> Result<Fragment, ResultError> {
    let dom_id = row_dom_id(handler.type_id(), key);
    let target = format!("#{}", dom_id);
    let fragment = match handler.render_row(key, editing)? {
        Some(model) => Fragment::oob(handler.views().row.clone(), model, Disposition::OuterHtml),
        None => Fragment::oob(TOMBSTONE_COMPONENT, json!({ "id": dom_id }), Disposition::Delete),
    };
    Ok(fragment.target(target))
}
