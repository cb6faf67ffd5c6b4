//! Column - typed column descriptor with accessor, filters and render overrides.
//!
//! ## Example
//!
//! ```ignore
//! let name = Column::<Person>::new("Name")
//!     .value(|p| p.name.clone())
//!     .field("name")
//!     .sortable()
//!     .contains_filter();
//! ```

use std::sync::Arc;

use serde::Serialize;

use super::cell::CellValue;
use super::query::{Accessor, Condition, Filter, Query};

/// Single-value filter: `(source, value) -> source`.
pub type FilterFn<T> = Arc<dyn Fn(Query<T>, &str) -> Query<T> + Send + Sync>;

/// Range filter: `(source, min, max) -> source`.
pub type RangeFilterFn<T> = Arc<dyn Fn(Query<T>, &str, &str) -> Query<T> + Send + Sync>;

/// Describes one column of a table over rows of type `T`.
pub struct Column<T> {
    header: String,
    sortable: bool,
    filterable: bool,
    hidden: bool,
    accessor: Option<Accessor<T>>,
    field: Option<String>,
    filter: Option<FilterFn<T>>,
    range_filter: Option<RangeFilterFn<T>>,
    cell_view: Option<String>,
    filter_view: Option<String>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            hidden: self.hidden,
            accessor: self.accessor.clone(),
            field: self.field.clone(),
            filter: self.filter.clone(),
            range_filter: self.range_filter.clone(),
            cell_view: self.cell_view.clone(),
            filter_view: self.filter_view.clone(),
        }
    }
}

/// Untyped column metadata handed to views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub header: String,
    pub sortable: bool,
    pub filterable: bool,
    pub range_filterable: bool,
    pub hidden: bool,
    pub field: Option<String>,
    pub cell_view: Option<String>,
    pub filter_view: Option<String>,
}

impl<T: 'static> Column<T> {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            sortable: false,
            filterable: false,
            hidden: false,
            accessor: None,
            field: None,
            filter: None,
            range_filter: None,
            cell_view: None,
            filter_view: None,
        }
    }

    /// Typed in-memory accessor for this column.
    pub fn value<V, F>(mut self, accessor: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.accessor = Some(Arc::new(move |item| accessor(item).into()));
        self
    }

    /// Declarative field path a query backend can translate.
    pub fn field(mut self, path: impl Into<String>) -> Self {
        self.field = Some(path.into());
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn cell_view(mut self, view: impl Into<String>) -> Self {
        self.cell_view = Some(view.into());
        self
    }

    pub fn filter_view(mut self, view: impl Into<String>) -> Self {
        self.filter_view = Some(view.into());
        self
    }

    /// Custom single-value filter.
    pub fn filter_with<F>(mut self, filter: F) -> Self
    where
        F: Fn(Query<T>, &str) -> Query<T> + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self.filterable = true;
        self
    }

    /// Custom range filter.
    pub fn range_filter_with<F>(mut self, filter: F) -> Self
    where
        F: Fn(Query<T>, &str, &str) -> Query<T> + Send + Sync + 'static,
    {
        self.range_filter = Some(Arc::new(filter));
        self.filterable = true;
        self
    }

    /// Keep rows whose displayed value contains the filter text (case-sensitive).
    ///
    /// Call after `value` (and `field`, if the backend needs the condition).
    pub fn contains_filter(self) -> Self {
        let accessor = self.accessor.clone();
        let field = self.field_or_header();
        self.filter_with(move |query, value| {
            let Some(accessor) = accessor.clone() else {
                return query;
            };
            let needle = value.to_string();
            let condition = Condition::Contains {
                field: field.clone(),
                value: needle.clone(),
            };
            query.filter(
                Filter::new(move |item| accessor(item).to_string().contains(&needle))
                    .with_condition(condition),
            )
        })
    }

    /// Keep rows whose value equals the parsed filter text.
    pub fn equals_filter(self) -> Self {
        let accessor = self.accessor.clone();
        let field = self.field_or_header();
        self.filter_with(move |query, value| {
            let Some(accessor) = accessor.clone() else {
                return query;
            };
            let expected = CellValue::parse(value);
            let condition = Condition::Equals {
                field: field.clone(),
                value: expected.clone(),
            };
            query.filter(
                Filter::new(move |item| accessor(item) == expected).with_condition(condition),
            )
        })
    }

    /// Keep rows whose value lies in `[min, max]` (inclusive).
    pub fn between_filter(self) -> Self {
        let accessor = self.accessor.clone();
        let field = self.field_or_header();
        self.range_filter_with(move |query, min, max| {
            let Some(accessor) = accessor.clone() else {
                return query;
            };
            let (lo, hi) = (CellValue::parse(min), CellValue::parse(max));
            let condition = Condition::Between {
                field: field.clone(),
                min: lo.clone(),
                max: hi.clone(),
            };
            query.filter(
                Filter::new(move |item| {
                    let v = accessor(item);
                    v >= lo && v <= hi
                })
                .with_condition(condition),
            )
        })
    }

    fn field_or_header(&self) -> String {
        self.field.clone().unwrap_or_else(|| self.header.clone())
    }
}

impl<T> Column<T> {
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn field_path(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn accessor(&self) -> Option<&Accessor<T>> {
        self.accessor.as_ref()
    }

    pub fn has_accessor(&self) -> bool {
        self.accessor.is_some()
    }

    /// The column's value for `item`, or `Null` when it has no accessor.
    pub fn value_of(&self, item: &T) -> CellValue {
        self.accessor
            .as_ref()
            .map(|accessor| accessor(item))
            .unwrap_or_default()
    }

    /// Apply this column's single-value filter, if it declares one.
    pub fn apply_filter(&self, query: Query<T>, value: &str) -> Query<T> {
        match &self.filter {
            Some(filter) => filter(query, value),
            None => query,
        }
    }

    /// Apply this column's range filter, if it declares one.
    pub fn apply_range_filter(&self, query: Query<T>, min: &str, max: &str) -> Query<T> {
        match &self.range_filter {
            Some(filter) => filter(query, min, max),
            None => query,
        }
    }

    pub fn info(&self) -> ColumnInfo {
        ColumnInfo {
            header: self.header.clone(),
            sortable: self.sortable,
            filterable: self.filter.is_some(),
            range_filterable: self.range_filter.is_some(),
            hidden: self.hidden,
            field: self.field.clone(),
            cell_view: self.cell_view.clone(),
            filter_view: self.filter_view.clone(),
        }
    }
}
