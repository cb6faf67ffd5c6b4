//! Table - generic, type-erased tabular query and render engine.
//!
//! A table is declared once per entity kind as a typed [`TableDef<T, K>`]:
//! a data source, a key selector and an ordered list of [`Column<T>`]s.
//! Each request applies a [`TableState`] (sort, filters, page) through the
//! [`QueryPipeline`] and renders the resulting page as a JSON view model.
//!
//! ## Example
//!
//! ```ignore
//! use swapped_rust::table::{Column, InMemorySource, TableDef, TableRegistry, TableState};
//!
//! let source = InMemorySource::new(people);
//! let table = TableDef::new("people", source, |p: &Person| p.id)
//!     .column(Column::new("Name").value(|p: &Person| p.name.clone()).sortable().contains_filter())
//!     .column(Column::new("Age").value(|p: &Person| p.age).sortable().between_filter());
//!
//! let mut state = TableState::new();
//! state.set_filter("Name", "abc");
//! let model = table.model(&mut state, false)?;
//! ```

mod cell;
mod column;
mod definition;
mod error;
mod model;
mod pipeline;
mod query;
mod registry;
mod source;
mod state;

pub use cell::CellValue;
pub use column::{Column, ColumnInfo, FilterFn, RangeFilterFn};
pub use definition::{TableDef, TableHandler};
pub use error::TableError;
pub use model::{
    decode_key, encode_key, row_dom_id, RowAction, RowContext, TableElementIds, TableModel,
    TableViews,
};
pub use pipeline::{clamp_page, page_count, QueryPipeline, TablePage};
pub use query::{Accessor, Condition, DataSource, Filter, Predicate, Query, Sort};
pub use registry::TableRegistry;
pub use source::InMemorySource;
pub use state::{RangeFilter, SortDirection, TableState, DEFAULT_PAGE_SIZE};

/// State-store partition holding table state and edit flags.
pub const TABLE_PARTITION: &str = "Table";

/// State-store key of a table's edit-mode flag.
pub fn editing_key(type_id: &str) -> String {
    format!("{}:editing", type_id)
}
