//! TableRegistry - explicit registration table mapping type ids to tables.
//!
//! ```ignore
//! let tables = TableRegistry::new()
//!     .register(people::table())
//!     .register(orders::table());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::definition::TableHandler;
use super::error::TableError;

#[derive(Clone, Default)]
pub struct TableRegistry {
    tables: HashMap<String, Arc<dyn TableHandler>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under its type id. A later registration with the
    /// same id replaces the earlier one.
    pub fn register<H: TableHandler + 'static>(mut self, table: H) -> Self {
        self.tables
            .insert(table.type_id().to_string(), Arc::new(table));
        self
    }

    pub fn get(&self, type_id: &str) -> Result<Arc<dyn TableHandler>, TableError> {
        self.tables
            .get(type_id)
            .cloned()
            .ok_or_else(|| TableError::UnknownTable(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.tables.contains_key(type_id)
    }

    /// Validate every registered table, failing on the first unusable one.
    pub fn validate(&self) -> Result<(), TableError> {
        self.type_ids()
            .into_iter()
            .filter_map(|id| self.tables.get(id))
            .try_for_each(|table| table.validate())
    }

    /// Registered type ids, sorted.
    pub fn type_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tables.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

/// Register table modules with a registry using the module convention.
///
/// Each module must export `table() -> TableDef<T, K>`.
///
/// # Example
/// ```ignore
/// let tables = swapped_rust::register_tables!(
///     TableRegistry::new(),
///     tables::people,
///     tables::orders,
/// );
/// ```
#[macro_export]
macro_rules! register_tables {
    ($registry:expr, $( $($seg:ident)::+ ),+ $(,)?) => {
        $registry
        $(
            .register($($seg)::+::table())
        )+
    };
}
