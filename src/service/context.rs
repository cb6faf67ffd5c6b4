//! Context passed to action handlers.
//!
//! Carries the parsed input, the request headers, both state stores and the
//! table registry. Handlers reach everything through the context.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::result::{stored_editing, stored_table_state};
use crate::state::StateStore;
use crate::table::{editing_key, TableHandler, TableRegistry, TableState, TABLE_PARTITION};

use super::error::HandlerError;
use super::request::RequestHeaders;

/// The context passed to every action handler.
///
/// ## Example
///
/// ```ignore
/// fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
///     let table = ctx.table("people")?;
///     let mut state = ctx.table_state(table.as_ref())?;
///     state.set_page(1);
///     ctx.save_table_state(table.type_id(), &state)?;
///     Ok(ActionOutcome::table("people"))
/// }
/// ```
pub struct Context<'a> {
    /// The action name being handled.
    command_name: &'a str,
    /// Raw JSON input from the request.
    input: Value,
    /// Request headers (auth identity, htmx flags, state tokens).
    request: &'a RequestHeaders,
    /// Every table the service knows about.
    tables: &'a TableRegistry,
    /// Page-scoped state, hydrated from the page token.
    page: &'a mut StateStore,
    /// State shared across pages, hydrated from the global token.
    global: &'a mut StateStore,
}

impl<'a> Context<'a> {
    /// Create a new context.
    pub(crate) fn new(
        command_name: &'a str,
        input: Value,
        request: &'a RequestHeaders,
        tables: &'a TableRegistry,
        page: &'a mut StateStore,
        global: &'a mut StateStore,
    ) -> Self {
        Self {
            command_name,
            input,
            request,
            tables,
            page,
            global,
        }
    }

    /// Deserialize the input payload into a typed struct.
    pub fn input<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(self.input.clone()).map_err(|e| HandlerError::DecodeFailed(e.to_string()))
    }

    /// Deserialize one top-level input field.
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<T, HandlerError> {
        let value = self
            .input
            .get(name)
            .ok_or_else(|| HandlerError::DecodeFailed(format!("missing field '{}'", name)))?;
        serde_json::from_value(value.clone())
            .map_err(|e| HandlerError::DecodeFailed(format!("field '{}': {}", name, e)))
    }

    /// Get the raw JSON input.
    pub fn raw_input(&self) -> &Value {
        &self.input
    }

    /// Get the action name.
    pub fn command_name(&self) -> &str {
        self.command_name
    }

    /// Get the request headers.
    pub fn request(&self) -> &RequestHeaders {
        self.request
    }

    /// The user id forwarded by the auth layer. `Unauthorized` if absent.
    pub fn user_id(&self) -> Result<&str, HandlerError> {
        self.request
            .user_id()
            .ok_or_else(|| HandlerError::Unauthorized("missing user ID".into()))
    }

    /// Get the user role forwarded by the auth layer.
    pub fn role(&self) -> Option<&str> {
        self.request.role()
    }

    /// Check if the raw input contains a field.
    pub fn has_field(&self, field: &str) -> bool {
        self.input.get(field).is_some()
    }

    /// Check if the raw input contains all specified fields.
    pub fn has_fields(&self, fields: &[&str]) -> bool {
        fields.iter().all(|f| self.has_field(f))
    }

    /// Get the table registry.
    pub fn tables(&self) -> &TableRegistry {
        self.tables
    }

    /// Look up a table by type id. `UnknownTable` if it is not registered.
    pub fn table(&self, type_id: &str) -> Result<Arc<dyn TableHandler>, HandlerError> {
        Ok(self.tables.get(type_id)?)
    }

    /// Page-scoped store.
    pub fn page(&self) -> &StateStore {
        &*self.page
    }

    /// Mutable page-scoped store. Writes here re-issue the page token.
    pub fn page_mut(&mut self) -> &mut StateStore {
        &mut *self.page
    }

    /// Store shared across pages.
    pub fn global(&self) -> &StateStore {
        &*self.global
    }

    /// Mutable global store. Writes here re-issue the global token.
    pub fn global_mut(&mut self) -> &mut StateStore {
        &mut *self.global
    }

    /// Stored state for `table`, or the table's default.
    pub fn table_state(&self, table: &dyn TableHandler) -> Result<TableState, HandlerError> {
        Ok(stored_table_state(&*self.page, table)?)
    }

    /// Persist `state` for the table in the page store.
    pub fn save_table_state(&mut self, type_id: &str, state: &TableState) -> Result<(), HandlerError> {
        self.page.set(TABLE_PARTITION, type_id, state)?;
        Ok(())
    }

    /// Whether the table is in edit mode for this page.
    pub fn editing(&self, type_id: &str) -> Result<bool, HandlerError> {
        Ok(stored_editing(&*self.page, type_id)?)
    }

    /// Switch edit mode. Writes only when the flag changes.
    pub fn set_editing(&mut self, type_id: &str, editing: bool) -> Result<(), HandlerError> {
        if self.editing(type_id)? == editing {
            return Ok(());
        }
        let key = editing_key(type_id);
        if editing {
            self.page.set(TABLE_PARTITION, &key, &true)?;
        } else {
            self.page.clear_key(TABLE_PARTITION, &key)?;
        }
        Ok(())
    }
}
