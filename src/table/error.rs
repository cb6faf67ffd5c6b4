use std::fmt;

/// Error type for the table query / render engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No column declares a value accessor, so no default sort exists.
    NoValueAccessor { table: String },
    /// No table registered under this type id.
    UnknownTable(String),
    /// No column with this header.
    UnknownColumn(String),
    /// The column exists but cannot be sorted on.
    NotSortable(String),
    /// A serialized row key could not be decoded.
    InvalidRowKey(String),
    /// No row with this key exists in the source.
    RowNotFound(String),
    /// The table has no handler registered for a CRUD operation.
    Unsupported {
        table: String,
        operation: &'static str,
    },
    /// The data source failed.
    Source(String),
    /// Row input could not be decoded.
    Decode(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::NoValueAccessor { table } => write!(
                f,
                "table {} has no column with a value accessor; cannot apply a default sort",
                table
            ),
            TableError::UnknownTable(id) => write!(f, "unknown table: {}", id),
            TableError::UnknownColumn(header) => write!(f, "unknown column: {}", header),
            TableError::NotSortable(header) => write!(f, "column is not sortable: {}", header),
            TableError::InvalidRowKey(key) => write!(f, "invalid row key: {}", key),
            TableError::RowNotFound(key) => write!(f, "row not found: {}", key),
            TableError::Unsupported { table, operation } => {
                write!(f, "table {} does not support {}", table, operation)
            }
            TableError::Source(msg) => write!(f, "data source error: {}", msg),
            TableError::Decode(msg) => write!(f, "row decode failed: {}", msg),
        }
    }
}

impl std::error::Error for TableError {}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Decode(err.to_string())
    }
}
