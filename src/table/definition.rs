//! TableDef - the typed definition of one table, and its type-erased face.
//!
//! `TableDef<T, K>` is fully generic over the row type `T` and key type `K`.
//! The rest of the system (registry, actions, result pipeline) only sees the
//! object-safe [`TableHandler`] trait, which speaks JSON view models and
//! serialized row keys.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::column::{Column, ColumnInfo};
use super::error::TableError;
use super::model::{decode_key, encode_key, RowAction, RowContext, TableModel, TableViews};
use super::pipeline::QueryPipeline;
use super::query::{DataSource, Query};
use super::state::TableState;

type KeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;
type RowActionsFn<T, K> = Arc<dyn Fn(&RowContext<T, K>) -> Vec<RowAction> + Send + Sync>;
type CreateFn<K> = Arc<dyn Fn(Value) -> Result<K, TableError> + Send + Sync>;
type UpdateFn<K> = Arc<dyn Fn(&K, Value) -> Result<(), TableError> + Send + Sync>;
type DeleteFn<K> = Arc<dyn Fn(&K) -> Result<bool, TableError> + Send + Sync>;

/// Type-erased table capabilities used by actions and the result pipeline.
pub trait TableHandler: Send + Sync {
    /// Stable identifier of the entity kind (also the DOM id prefix).
    fn type_id(&self) -> &str;

    fn views(&self) -> &TableViews;

    fn columns(&self) -> Vec<ColumnInfo>;

    fn has_column(&self, header: &str) -> bool;

    /// True when the column is declared sortable and has a value accessor.
    fn is_sortable(&self, header: &str) -> bool;

    /// Check the definition can be queried at all: some column must carry a
    /// value accessor for the default sort.
    fn validate(&self) -> Result<(), TableError>;

    /// State used when the page store holds none for this table yet.
    fn default_state(&self) -> TableState;

    /// Fetch a page and return its view model. Clamps `state.page`.
    fn render_model(&self, state: &mut TableState, editing: bool) -> Result<Value, TableError>;

    /// View model of a single row, or `None` if the row no longer exists.
    fn render_row(&self, key: &str, editing: bool) -> Result<Option<Value>, TableError>;

    /// Create a row from input; returns its serialized key.
    fn create(&self, input: Value) -> Result<String, TableError>;

    fn update(&self, key: &str, input: Value) -> Result<(), TableError>;

    /// Delete a row. Returns false if it did not exist.
    fn delete(&self, key: &str) -> Result<bool, TableError>;
}

/// Typed table definition: query source, key selector, columns, CRUD and views.
pub struct TableDef<T, K> {
    type_id: String,
    source: Arc<dyn DataSource<T>>,
    key: KeyFn<T, K>,
    columns: Vec<Column<T>>,
    views: TableViews,
    page_size: usize,
    table_actions: Vec<RowAction>,
    row_actions: Option<RowActionsFn<T, K>>,
    create: Option<CreateFn<K>>,
    update: Option<UpdateFn<K>>,
    delete: Option<DeleteFn<K>>,
}

impl<T, K> TableDef<T, K>
where
    T: Send + Sync + 'static,
    K: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new<S, F>(type_id: impl Into<String>, source: S, key: F) -> Self
    where
        S: DataSource<T> + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            type_id: type_id.into(),
            source: Arc::new(source),
            key: Arc::new(key),
            columns: Vec::new(),
            views: TableViews::default(),
            page_size: TableState::default().page_size,
            table_actions: Vec::new(),
            row_actions: None,
            create: None,
            update: None,
            delete: None,
        }
    }

    pub fn column(mut self, column: Column<T>) -> Self {
        self.columns.push(column);
        self
    }

    pub fn views(mut self, views: TableViews) -> Self {
        self.views = views;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add an entry to the table-level action list.
    pub fn action(mut self, action: RowAction) -> Self {
        self.table_actions.push(action);
        self
    }

    pub fn row_actions<F>(mut self, actions: F) -> Self
    where
        F: Fn(&RowContext<T, K>) -> Vec<RowAction> + Send + Sync + 'static,
    {
        self.row_actions = Some(Arc::new(actions));
        self
    }

    pub fn on_create<F>(mut self, create: F) -> Self
    where
        F: Fn(Value) -> Result<K, TableError> + Send + Sync + 'static,
    {
        self.create = Some(Arc::new(create));
        self
    }

    pub fn on_update<F>(mut self, update: F) -> Self
    where
        F: Fn(&K, Value) -> Result<(), TableError> + Send + Sync + 'static,
    {
        self.update = Some(Arc::new(update));
        self
    }

    pub fn on_delete<F>(mut self, delete: F) -> Self
    where
        F: Fn(&K) -> Result<bool, TableError> + Send + Sync + 'static,
    {
        self.delete = Some(Arc::new(delete));
        self
    }

    /// Run the query pipeline and assemble the typed model.
    pub fn model(&self, state: &mut TableState, editing: bool) -> Result<TableModel<T, K>, TableError> {
        let pipeline = QueryPipeline::new(&self.type_id, self.source.as_ref(), &self.columns);
        let key = self.key.clone();
        let page = pipeline.build(state, move |item| key(item), editing)?;
        Ok(TableModel {
            type_id: self.type_id.clone(),
            rows: page.rows,
            columns: self.columns.clone(),
            page_count: page.page_count,
            total: page.total,
            state: state.clone(),
            editing,
            views: self.views.clone(),
        })
    }

    /// Look up one row by its serialized key, ignoring the table's filters.
    pub fn find_row(&self, key: &str, editing: bool) -> Result<Option<RowContext<T, K>>, TableError> {
        let selector = self.key.clone();
        let target = key.to_string();
        let query = Query::new().matching(move |item: &T| {
            encode_key(&selector(item)).map(|k| k == target).unwrap_or(false)
        });
        let item = self.source.fetch(&query, 0, 1)?.into_iter().next();
        Ok(item.map(|item| RowContext {
            key: (self.key)(&item),
            key_string: key.to_string(),
            item,
            index: 0,
            editing,
        }))
    }

    pub fn row_view(&self, row: &RowContext<T, K>) -> Value {
        let cells: Vec<Value> = self
            .columns
            .iter()
            .map(|column| {
                let info = column.info();
                json!({
                    "header": info.header,
                    "value": column.value_of(&row.item).to_string(),
                    "hidden": info.hidden,
                    "view": info.cell_view,
                })
            })
            .collect();
        let actions = self
            .row_actions
            .as_ref()
            .map(|actions| actions(row))
            .unwrap_or_default();
        json!({
            "key": row.key_string,
            "dom_id": row.dom_id(&self.type_id),
            "index": row.index,
            "editing": row.editing,
            "cells": cells,
            "actions": actions,
            "view": self.views.row,
        })
    }

    pub fn view_model(&self, model: &TableModel<T, K>) -> Value {
        let rows: Vec<Value> = model.rows.iter().map(|row| self.row_view(row)).collect();
        let columns: Vec<ColumnInfo> = model.columns.iter().map(Column::info).collect();
        let pages: Vec<usize> = (1..=model.page_count).collect();
        json!({
            "type_id": model.type_id,
            "ids": model.element_ids(),
            "views": model.views,
            "columns": columns,
            "rows": rows,
            "actions": self.table_actions,
            "editing": model.editing,
            "total": model.total,
            "page": model.state.page,
            "page_size": model.state.page_size,
            "page_count": model.page_count,
            "pages": pages,
            "sort_column": model.state.sort_column,
            "sort_direction": model.state.sort_direction.as_str(),
            "filters": model.state.filters,
            "range_filters": model.state.range_filters,
        })
    }
}

impl<T, K> TableHandler for TableDef<T, K>
where
    T: Send + Sync + 'static,
    K: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn views(&self) -> &TableViews {
        &self.views
    }

    fn columns(&self) -> Vec<ColumnInfo> {
        self.columns.iter().map(Column::info).collect()
    }

    fn has_column(&self, header: &str) -> bool {
        self.columns.iter().any(|c| c.header() == header)
    }

    fn is_sortable(&self, header: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.header() == header && c.is_sortable() && c.has_accessor())
    }

    fn validate(&self) -> Result<(), TableError> {
        if self.columns.iter().any(Column::has_accessor) {
            Ok(())
        } else {
            Err(TableError::NoValueAccessor {
                table: self.type_id.clone(),
            })
        }
    }

    fn default_state(&self) -> TableState {
        TableState::new().with_page_size(self.page_size)
    }

    fn render_model(&self, state: &mut TableState, editing: bool) -> Result<Value, TableError> {
        let model = self.model(state, editing)?;
        Ok(self.view_model(&model))
    }

    fn render_row(&self, key: &str, editing: bool) -> Result<Option<Value>, TableError> {
        Ok(self.find_row(key, editing)?.map(|row| self.row_view(&row)))
    }

    fn create(&self, input: Value) -> Result<String, TableError> {
        let create = self.create.as_ref().ok_or_else(|| TableError::Unsupported {
            table: self.type_id.clone(),
            operation: "create",
        })?;
        encode_key(&create(input)?)
    }

    fn update(&self, key: &str, input: Value) -> Result<(), TableError> {
        let update = self.update.as_ref().ok_or_else(|| TableError::Unsupported {
            table: self.type_id.clone(),
            operation: "update",
        })?;
        let key: K = decode_key(key)?;
        update(&key, input)
    }

    fn delete(&self, key: &str) -> Result<bool, TableError> {
        let delete = self.delete.as_ref().ok_or_else(|| TableError::Unsupported {
            table: self.type_id.clone(),
            operation: "delete",
        })?;
        let key: K = decode_key(key)?;
        delete(&key)
    }
}
