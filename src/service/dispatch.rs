//! Service - action registry and dispatch.
//!
//! Every action is registered with a [`ResultPolicy`] and a handler. A
//! dispatch hydrates both state stores from the request, runs the guard and
//! handler, then hands the outcome to the [`ResultPipeline`].
//!
//! ## Example
//!
//! ```ignore
//! use swapped_rust::result::{ActionOutcome, ResultPolicy};
//! use swapped_rust::service::{RequestHeaders, Service};
//!
//! let service = Service::new(config, protector, views)
//!     .tables(register_tables!(TableRegistry::new(), tables::people))?
//!     .action("home.show", ResultPolicy::nav(), |_ctx| {
//!         Ok(ActionOutcome::view("Home", json!({})))
//!     });
//!
//! let rendered = service.dispatch("table.sort", json!({ "table": "people", "column": "Name" }), headers)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::{ConfigError, ServiceConfig};
use crate::fragment::{FragmentRenderer, SwapComposer};
use crate::result::{ActionOutcome, NavigationProvider, Rendered, ResultPipeline, ResultPolicy, StaticNavigation};
use crate::state::{DataProtector, StateStore};
use crate::table::{TableError, TableRegistry};

use super::context::Context;
use super::error::HandlerError;
use super::request::RequestHeaders;
use super::table_actions;

type GuardFn = Box<dyn Fn(&Context<'_>) -> bool + Send + Sync>;
type HandleFn = Box<dyn Fn(&mut Context<'_>) -> Result<ActionOutcome, HandlerError> + Send + Sync>;

/// A registered action: its result policy, optional guard and handler.
struct Action {
    policy: ResultPolicy,
    guard: Option<GuardFn>,
    handle: HandleFn,
}

/// Routes actions to handlers and renders their results.
///
/// The built-in `table.*` actions are always registered; they operate on
/// whatever tables are supplied through [`Service::tables`].
pub struct Service {
    config: ServiceConfig,
    protector: Arc<dyn DataProtector>,
    composer: SwapComposer,
    tables: TableRegistry,
    navigation: Arc<dyn NavigationProvider>,
    actions: HashMap<String, Action>,
}

impl Service {
    pub fn new(
        config: ServiceConfig,
        protector: Arc<dyn DataProtector>,
        renderer: Arc<dyn FragmentRenderer>,
    ) -> Self {
        let service = Self {
            config,
            protector,
            composer: SwapComposer::new(renderer),
            tables: TableRegistry::new(),
            navigation: Arc::new(StaticNavigation::new()),
            actions: HashMap::new(),
        };
        table_actions::register(service)
    }

    /// Build a service whose protector comes from `config.state_key`.
    pub fn from_config(config: ServiceConfig, renderer: Arc<dyn FragmentRenderer>) -> Result<Self, ConfigError> {
        let protector = Arc::new(config.protector()?);
        Ok(Self::new(config, protector, renderer))
    }

    /// Install the table registry. Fails if any table cannot be queried.
    pub fn tables(mut self, tables: TableRegistry) -> Result<Self, TableError> {
        tables.validate()?;
        tracing::debug!(tables = ?tables.type_ids(), "tables registered");
        self.tables = tables;
        Ok(self)
    }

    pub fn navigation<N: NavigationProvider + 'static>(mut self, navigation: N) -> Self {
        self.navigation = Arc::new(navigation);
        self
    }

    /// Register an action. A later registration under the same name replaces it.
    pub fn action<F>(mut self, name: &str, policy: ResultPolicy, handler: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Result<ActionOutcome, HandlerError> + Send + Sync + 'static,
    {
        self.actions.insert(
            name.to_string(),
            Action {
                policy,
                guard: None,
                handle: Box::new(handler),
            },
        );
        self
    }

    /// Register an action with a guard. If the guard returns `false`,
    /// dispatch fails with `HandlerError::GuardRejected`.
    pub fn action_guarded<G, F>(mut self, name: &str, policy: ResultPolicy, guard: G, handler: F) -> Self
    where
        G: Fn(&Context<'_>) -> bool + Send + Sync + 'static,
        F: Fn(&mut Context<'_>) -> Result<ActionOutcome, HandlerError> + Send + Sync + 'static,
    {
        self.actions.insert(
            name.to_string(),
            Action {
                policy,
                guard: Some(Box::new(guard)),
                handle: Box::new(handler),
            },
        );
        self
    }

    /// Dispatch an action by name.
    pub fn dispatch(&self, command: &str, input: Value, request: RequestHeaders) -> Result<Rendered, HandlerError> {
        let action = self
            .actions
            .get(command)
            .ok_or_else(|| HandlerError::UnknownCommand(command.to_string()))?;

        let mut page = StateStore::page(self.protector.clone());
        let mut global = StateStore::global(self.protector.clone());
        let page_load = page.load(incoming_token(
            &request,
            &input,
            &self.config.page_state_header,
            &self.config.page_state_element,
        ));
        let global_load = global.load(incoming_token(
            &request,
            &input,
            &self.config.global_state_header,
            &self.config.global_state_element,
        ));
        tracing::debug!(command, ?page_load, ?global_load, "dispatching action");

        let outcome = {
            let mut ctx = Context::new(command, input, &request, &self.tables, &mut page, &mut global);
            if let Some(guard) = &action.guard {
                if !guard(&ctx) {
                    return Err(HandlerError::GuardRejected(command.to_string()));
                }
            }
            (action.handle)(&mut ctx)?
        };

        let pipeline = ResultPipeline::new(&self.config, &self.tables, self.navigation.as_ref(), &self.composer);
        let rendered = pipeline.run(&action.policy, outcome, &request, &mut page, &mut global)?;
        tracing::debug!(
            command,
            kind = %action.policy.kind(),
            full_page = rendered.full_page,
            "action rendered"
        );
        Ok(rendered)
    }

    /// Registered action names, sorted.
    pub fn actions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn policy(&self, name: &str) -> Option<&ResultPolicy> {
        self.actions.get(name).map(|a| &a.policy)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.tables
    }
}

/// Token from the configured header, else from the hidden-field value in the input.
fn incoming_token<'r>(
    request: &'r RequestHeaders,
    input: &'r Value,
    header: &str,
    element: &str,
) -> Option<&'r str> {
    request
        .get(header)
        .or_else(|| input.get(element).and_then(Value::as_str))
}
