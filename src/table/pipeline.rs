//! QueryPipeline - applies a `TableState` to a data source.
//!
//! Fixed order: single-value filters, range filters, sort (with a
//! deterministic fallback), count, clamp the page, fetch one window, key rows.

use serde::Serialize;

use super::column::Column;
use super::error::TableError;
use super::model::{encode_key, RowContext};
use super::query::{DataSource, Query, Sort};
use super::state::{SortDirection, TableState};

/// Result of one page fetch.
#[derive(Debug, Clone)]
pub struct TablePage<T, K> {
    pub rows: Vec<RowContext<T, K>>,
    pub page_count: usize,
    pub total: usize,
}

/// `ceil(total / page_size)`; 0 when there are no rows.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Clamp a requested page into `[1, max(page_count, 1)]`.
pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

pub struct QueryPipeline<'a, T> {
    table: &'a str,
    source: &'a dyn DataSource<T>,
    columns: &'a [Column<T>],
}

impl<'a, T> QueryPipeline<'a, T> {
    pub fn new(table: &'a str, source: &'a dyn DataSource<T>, columns: &'a [Column<T>]) -> Self {
        Self {
            table,
            source,
            columns,
        }
    }

    fn column(&self, header: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|c| c.header() == header)
    }

    /// Build the filtered and ordered query for `state` (steps 1-3).
    pub fn plan(&self, state: &TableState) -> Result<Query<T>, TableError> {
        let mut query = Query::new();

        for (header, value) in state.active_filters() {
            if let Some(column) = self.column(header) {
                query = column.apply_filter(query, value);
            }
        }

        for (header, range) in state.active_range_filters() {
            if let Some(column) = self.column(header) {
                query = column.apply_range_filter(query, &range.min, &range.max);
            }
        }

        let requested = state
            .sort_column
            .as_deref()
            .and_then(|header| self.column(header))
            .filter(|column| column.is_sortable())
            .and_then(|column| column.accessor().map(|a| (column, a, state.sort_direction)));

        let (column, accessor, direction) = match requested {
            Some(sort) => sort,
            None => {
                let column = self
                    .columns
                    .iter()
                    .find(|c| c.has_accessor())
                    .ok_or_else(|| TableError::NoValueAccessor {
                        table: self.table.to_string(),
                    })?;
                let accessor = column.accessor().ok_or_else(|| TableError::NoValueAccessor {
                    table: self.table.to_string(),
                })?;
                (column, accessor, SortDirection::Asc)
            }
        };

        Ok(query.order_by(Sort::new(
            accessor.clone(),
            column.field_path().map(str::to_string),
            direction,
        )))
    }

    /// Run the full pipeline. Mutates `state.page` when it was out of range.
    pub fn build<K, F>(
        &self,
        state: &mut TableState,
        key: F,
        editing: bool,
    ) -> Result<TablePage<T, K>, TableError>
    where
        K: Serialize,
        F: Fn(&T) -> K,
    {
        let query = self.plan(state)?;

        let total = self.source.count(&query)?;
        let page_size = state.page_size.max(1);
        let pages = page_count(total, page_size);
        state.page_size = page_size;
        state.page = clamp_page(state.page, pages);

        let skip = (state.page - 1) * page_size;
        let items = self.source.fetch(&query, skip, page_size)?;

        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let key = key(&item);
            let key_string = encode_key(&key)?;
            rows.push(RowContext {
                item,
                index,
                key,
                key_string,
                editing,
            });
        }

        tracing::debug!(
            table = self.table,
            total,
            page = state.page,
            page_count = pages,
            "table page fetched"
        );

        Ok(TablePage {
            rows,
            page_count: pages,
            total,
        })
    }
}
