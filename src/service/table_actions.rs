//! Built-in `table.*` actions.
//!
//! Each action follows the handler-module convention (`ACTION`, `policy`,
//! `guard`, `handle`) and names its table in the `table` input field. All of
//! them fall back to the table's page view for non-fragment requests.

use std::sync::Arc;

use serde::Deserialize;

use crate::result::{ActionOutcome, ResultKind, ResultPolicy};
use crate::table::{TableError, TableHandler};

use super::context::Context;
use super::dispatch::Service;
use super::error::HandlerError;
use super::input;

/// Register every built-in table action on `service`.
pub(crate) fn register(service: Service) -> Service {
    crate::register_actions!(
        service,
        list,
        sort,
        page,
        page_size,
        filter,
        range_filter,
        clear_filters,
        edit_mode,
        create_row,
        update_row,
        delete_row,
    )
}

fn table_of(ctx: &Context<'_>) -> Result<Arc<dyn TableHandler>, HandlerError> {
    let type_id: String = ctx.field("table")?;
    ctx.table(&type_id)
}

fn known_column(table: &dyn TableHandler, column: &str) -> Result<(), HandlerError> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(TableError::UnknownColumn(column.to_string()).into())
    }
}

fn sortable_column(table: &dyn TableHandler, column: &str) -> Result<(), HandlerError> {
    known_column(table, column)?;
    if table.is_sortable(column) {
        Ok(())
    } else {
        Err(TableError::NotSortable(column.to_string()).into())
    }
}

/// Load, modify and save a table's state; the table is then refreshed.
fn update_state<F>(ctx: &mut Context<'_>, modify: F) -> Result<ActionOutcome, HandlerError>
where
    F: FnOnce(&dyn TableHandler, &mut crate::table::TableState) -> Result<(), HandlerError>,
{
    let table = table_of(ctx)?;
    let mut state = ctx.table_state(table.as_ref())?;
    modify(table.as_ref(), &mut state)?;
    ctx.save_table_state(table.type_id(), &state)?;
    Ok(ActionOutcome::table(table.type_id()))
}

fn has_table(ctx: &Context<'_>) -> bool {
    ctx.has_field("table")
}

/// Render the whole table in the main slot.
pub mod list {
    use super::*;

    pub const ACTION: &str = "table.list";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Content)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        has_table(ctx)
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let table = table_of(ctx)?;
        let mut outcome = ActionOutcome::table(table.type_id());
        outcome.view = Some(table.views().table.clone());
        Ok(outcome)
    }
}

/// Toggle sorting on a column: `{ table, column }`.
pub mod sort {
    use super::*;

    pub const ACTION: &str = "table.sort";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Refresh)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        ctx.has_fields(&["table", "column"])
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let column: String = ctx.field("column")?;
        update_state(ctx, |table, state| {
            sortable_column(table, &column)?;
            state.toggle_sort(&column);
            Ok(())
        })
    }
}

/// Go to a page: `{ table, page }`.
pub mod page {
    use super::*;

    pub const ACTION: &str = "table.page";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Refresh)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        ctx.has_fields(&["table", "page"])
    }

    #[derive(Deserialize)]
    struct Input {
        #[serde(deserialize_with = "input::number")]
        page: usize,
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let Input { page } = ctx.input()?;
        update_state(ctx, |_, state| {
            state.set_page(page);
            Ok(())
        })
    }
}

/// Change the page size: `{ table, size }`.
pub mod page_size {
    use super::*;

    pub const ACTION: &str = "table.page_size";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Refresh)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        ctx.has_fields(&["table", "size"])
    }

    #[derive(Deserialize)]
    struct Input {
        #[serde(deserialize_with = "input::number")]
        size: usize,
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let Input { size } = ctx.input()?;
        update_state(ctx, |_, state| {
            state.set_page_size(size);
            Ok(())
        })
    }
}

/// Set or clear a text filter: `{ table, column, value }`.
pub mod filter {
    use super::*;

    pub const ACTION: &str = "table.filter";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Refresh)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        ctx.has_fields(&["table", "column"])
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let column: String = ctx.field("column")?;
        let value: Option<String> = ctx.raw_input().get("value").and_then(|v| v.as_str()).map(str::to_string);
        update_state(ctx, |table, state| {
            known_column(table, &column)?;
            state.set_filter(&column, value.as_deref().unwrap_or_default());
            Ok(())
        })
    }
}

/// Set a range filter: `{ table, column, min?, max? }`.
pub mod range_filter {
    use super::*;

    #[derive(Deserialize)]
    struct Input {
        column: String,
        #[serde(default)]
        min: String,
        #[serde(default)]
        max: String,
    }

    pub const ACTION: &str = "table.range_filter";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Refresh)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        ctx.has_fields(&["table", "column"])
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let input: Input = ctx.input()?;
        update_state(ctx, |table, state| {
            known_column(table, &input.column)?;
            state.set_range_filter(&input.column, crate::table::RangeFilter::new(input.min, input.max));
            Ok(())
        })
    }
}

/// Drop every filter: `{ table }`.
pub mod clear_filters {
    use super::*;

    pub const ACTION: &str = "table.clear_filters";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Refresh)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        has_table(ctx)
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        update_state(ctx, |_, state| {
            state.clear_filters();
            Ok(())
        })
    }
}

/// Switch edit mode: `{ table, editing? }`. Without `editing` the mode toggles.
pub mod edit_mode {
    use super::*;

    #[derive(Deserialize)]
    struct Input {
        #[serde(default, deserialize_with = "input::optional_flag")]
        editing: Option<bool>,
    }

    pub const ACTION: &str = "table.edit_mode";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Refresh)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        has_table(ctx)
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let table = table_of(ctx)?;
        let Input { editing: requested } = ctx.input()?;
        let editing = match requested {
            Some(editing) => editing,
            None => !ctx.editing(table.type_id())?,
        };
        ctx.set_editing(table.type_id(), editing)?;
        Ok(ActionOutcome::table(table.type_id()))
    }
}

/// Create a row: `{ table, values }`.
pub mod create_row {
    use super::*;

    pub const ACTION: &str = "table.create_row";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Refresh)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        ctx.has_fields(&["table", "values"])
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let table = table_of(ctx)?;
        let values = ctx.field("values")?;
        let key = table.create(values)?;
        tracing::debug!(table = table.type_id(), %key, "row created");
        Ok(ActionOutcome::table(table.type_id()))
    }
}

/// Update a row: `{ table, key, values }`.
pub mod update_row {
    use super::*;

    pub const ACTION: &str = "table.update_row";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Edit)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        ctx.has_fields(&["table", "key", "values"])
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let table = table_of(ctx)?;
        let key: String = ctx.field("key")?;
        let values = ctx.field("values")?;
        table.update(&key, values)?;
        Ok(ActionOutcome::rows(table.type_id(), [key]))
    }
}

/// Delete a row: `{ table, key }`.
pub mod delete_row {
    use super::*;

    pub const ACTION: &str = "table.delete_row";

    pub fn policy() -> ResultPolicy {
        ResultPolicy::table_page(ResultKind::Edit)
    }

    pub fn guard(ctx: &Context<'_>) -> bool {
        ctx.has_fields(&["table", "key"])
    }

    pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
        let table = table_of(ctx)?;
        let key: String = ctx.field("key")?;
        if !table.delete(&key)? {
            return Err(HandlerError::NotFound(key));
        }
        Ok(ActionOutcome::rows(table.type_id(), [key]))
    }
}
