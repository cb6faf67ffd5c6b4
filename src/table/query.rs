//! Query - the abstract, composable request against a data source.
//!
//! A `Query<T>` carries two artifacts per condition: a typed in-memory predicate
//! and, optionally, a declarative `Condition` naming a field path. In-memory
//! sources evaluate the predicate; a backend that translates queries (SQL, a
//! search index, ...) reads the conditions instead. The two never share an object.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use super::cell::CellValue;
use super::error::TableError;
use super::state::SortDirection;

/// Typed in-memory value accessor.
pub type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// Typed in-memory row predicate.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Declarative form of a filter, addressed by field path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    Contains { field: String, value: String },
    Equals { field: String, value: CellValue },
    Between { field: String, min: CellValue, max: CellValue },
}

/// One filter step. Filters in a query compose with logical AND.
pub struct Filter<T> {
    predicate: Predicate<T>,
    condition: Option<Condition>,
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<T> Filter<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.predicate)(item)
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// Ordering applied to a query.
pub struct Sort<T> {
    field: Option<String>,
    key: Accessor<T>,
    direction: SortDirection,
}

impl<T> Clone for Sort<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            key: self.key.clone(),
            direction: self.direction,
        }
    }
}

impl<T> Sort<T> {
    pub fn new(key: Accessor<T>, field: Option<String>, direction: SortDirection) -> Self {
        Self {
            field,
            key,
            direction,
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let ord = (self.key)(a).cmp(&(self.key)(b));
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// A filter + sort plan against an abstract data source.
pub struct Query<T> {
    filters: Vec<Filter<T>>,
    sort: Option<Sort<T>>,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: None,
        }
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            sort: self.sort.clone(),
        }
    }
}

impl<T> Query<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter (AND with any existing ones).
    pub fn filter(mut self, filter: Filter<T>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Shorthand for an ad-hoc predicate with no declarative form.
    pub fn matching<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter(Filter::new(predicate))
    }

    /// Set the ordering, replacing any previous one.
    pub fn order_by(mut self, sort: Sort<T>) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn filters(&self) -> &[Filter<T>] {
        &self.filters
    }

    pub fn sort(&self) -> Option<&Sort<T>> {
        self.sort.as_ref()
    }

    pub fn matches(&self, item: &T) -> bool {
        self.filters.iter().all(|f| f.matches(item))
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        match &self.sort {
            Some(sort) => sort.compare(a, b),
            None => Ordering::Equal,
        }
    }
}

/// An abstract queryable data source.
///
/// Implementations must apply every filter of the query and honor its sort
/// before skipping / taking, so that pagination is stable.
pub trait DataSource<T>: Send + Sync {
    /// Count rows matching the query's filters.
    fn count(&self, query: &Query<T>) -> Result<usize, TableError>;

    /// Fetch one window of matching rows in query order.
    fn fetch(&self, query: &Query<T>, skip: usize, take: usize) -> Result<Vec<T>, TableError>;
}
