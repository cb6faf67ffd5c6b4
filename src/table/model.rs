//! Row and table models produced by a page fetch.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::column::Column;
use super::error::TableError;
use super::state::TableState;

/// Serialize a composite row key to a stable, DOM-id-safe string.
pub fn encode_key<K: Serialize>(key: &K) -> Result<String, TableError> {
    let bytes = serde_json::to_vec(key)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Inverse of [`encode_key`].
pub fn decode_key<K: DeserializeOwned>(encoded: &str) -> Result<K, TableError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| TableError::InvalidRowKey(encoded.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|_| TableError::InvalidRowKey(encoded.to_string()))
}

/// DOM id of a table row.
pub fn row_dom_id(type_id: &str, key: &str) -> String {
    format!("{}-row-{}", type_id, key)
}

/// One fetched row: the item, its page-relative index and its key.
///
/// Created per page fetch and dropped at the end of the response.
#[derive(Debug, Clone)]
pub struct RowContext<T, K> {
    pub item: T,
    pub index: usize,
    pub key: K,
    pub key_string: String,
    pub editing: bool,
}

impl<T, K> RowContext<T, K> {
    pub fn dom_id(&self, type_id: &str) -> String {
        row_dom_id(type_id, &self.key_string)
    }
}

/// An action offered on a row (edit, delete, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowAction {
    pub name: String,
    pub label: String,
}

impl RowAction {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// View names used to render a table and its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableViews {
    pub page: String,
    pub table: String,
    pub header: String,
    pub body: String,
    pub row: String,
    pub pagination: String,
    pub action_list: String,
    pub edit_toggle: String,
}

impl Default for TableViews {
    fn default() -> Self {
        Self::under("Table")
    }
}

impl TableViews {
    /// Standard part names under a view folder, e.g. `People/Body`.
    pub fn under(folder: &str) -> Self {
        Self {
            page: format!("{}/Page", folder),
            table: format!("{}/Table", folder),
            header: format!("{}/Header", folder),
            body: format!("{}/Body", folder),
            row: format!("{}/Row", folder),
            pagination: format!("{}/Pagination", folder),
            action_list: format!("{}/ActionList", folder),
            edit_toggle: format!("{}/EditToggle", folder),
        }
    }
}

/// DOM ids of the independently swappable table parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableElementIds {
    pub table: String,
    pub header: String,
    pub body: String,
    pub pagination: String,
    pub action_list: String,
    pub edit_toggle: String,
}

impl TableElementIds {
    pub fn for_type(type_id: &str) -> Self {
        Self {
            table: format!("{}-table", type_id),
            header: format!("{}-header", type_id),
            body: format!("{}-body", type_id),
            pagination: format!("{}-pagination", type_id),
            action_list: format!("{}-actions", type_id),
            edit_toggle: format!("{}-edit-toggle", type_id),
        }
    }
}

/// A fully fetched table page, ready to render.
pub struct TableModel<T, K> {
    pub type_id: String,
    pub rows: Vec<RowContext<T, K>>,
    pub columns: Vec<Column<T>>,
    pub page_count: usize,
    pub total: usize,
    pub state: TableState,
    pub editing: bool,
    pub views: TableViews,
}

impl<T, K> TableModel<T, K> {
    pub fn element_ids(&self) -> TableElementIds {
        TableElementIds::for_type(&self.type_id)
    }
}
