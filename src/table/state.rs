//! TableState - per-request sort / filter / page parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Both ends of a range filter. Only applied when both are non-blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: String,
    pub max: String,
}

impl RangeFilter {
    pub fn new(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.min.trim().is_empty() && !self.max.trim().is_empty()
    }
}

/// Sort, filter and pagination parameters for one table.
///
/// Lives in the page state store between requests (partition `Table`, keyed by
/// the table's type id) and is mutated by the table actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    #[serde(default)]
    pub sort_column: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
    pub page: usize,
    pub page_size: usize,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    #[serde(default)]
    pub range_filters: BTreeMap<String, RangeFilter>,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            sort_column: None,
            sort_direction: SortDirection::Asc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filters: BTreeMap::new(),
            range_filters: BTreeMap::new(),
        }
    }
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.set_page_size(page_size);
        self
    }

    /// Sort by `column`. Sorting the already-sorted column again flips the direction;
    /// a new column always starts ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        if self.sort_column.as_deref() == Some(column) {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_column = Some(column.to_string());
            self.sort_direction = SortDirection::Asc;
        }
    }

    pub fn set_sort(&mut self, column: Option<String>, direction: SortDirection) {
        self.sort_column = column;
        self.sort_direction = direction;
    }

    /// Request a page. Values below 1 become 1; the upper bound is clamped
    /// by the query pipeline once the row count is known.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Set or clear (blank value) a single-value filter and return to page 1.
    pub fn set_filter(&mut self, column: &str, value: &str) {
        if value.trim().is_empty() {
            self.filters.remove(column);
        } else {
            self.filters.insert(column.to_string(), value.to_string());
        }
        self.page = 1;
    }

    pub fn set_range_filter(&mut self, column: &str, range: RangeFilter) {
        if range.min.trim().is_empty() && range.max.trim().is_empty() {
            self.range_filters.remove(column);
        } else {
            self.range_filters.insert(column.to_string(), range);
        }
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.range_filters.clear();
        self.page = 1;
    }

    /// Filters that actually apply: non-blank values only.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Range filters that actually apply: both bounds present.
    pub fn active_range_filters(&self) -> impl Iterator<Item = (&str, &RangeFilter)> {
        self.range_filters
            .iter()
            .filter(|(_, r)| r.is_complete())
            .map(|(k, r)| (k.as_str(), r))
    }
}
