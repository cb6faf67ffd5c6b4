//! Error types for action handlers and dispatch.

use std::error::Error;
use std::fmt;

use crate::fragment::ComposeError;
use crate::result::ResultError;
use crate::state::StateError;
use crate::table::TableError;

/// Error type for action dispatch.
#[derive(Debug)]
pub enum HandlerError {
    /// No action registered under this name.
    UnknownCommand(String),
    /// Input decode / deserialization failed.
    DecodeFailed(String),
    /// Business logic rejected the action.
    Rejected(String),
    /// Row or resource not found.
    NotFound(String),
    /// Missing or invalid authentication.
    Unauthorized(String),
    /// Guard rejected the input.
    GuardRejected(String),
    Table(TableError),
    State(StateError),
    Result(ResultError),
    Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::UnknownCommand(name) => write!(f, "unknown command: {}", name),
            HandlerError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
            HandlerError::Rejected(msg) => write!(f, "rejected: {}", msg),
            HandlerError::NotFound(id) => write!(f, "not found: {}", id),
            HandlerError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            HandlerError::GuardRejected(name) => write!(f, "guard rejected command: {}", name),
            HandlerError::Table(e) => write!(f, "table error: {}", e),
            HandlerError::State(e) => write!(f, "state error: {}", e),
            HandlerError::Result(e) => write!(f, "result error: {}", e),
            HandlerError::Other(e) => write!(f, "handler error: {}", e),
        }
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HandlerError::Table(e) => Some(e),
            HandlerError::State(e) => Some(e),
            HandlerError::Result(e) => Some(e),
            HandlerError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<TableError> for HandlerError {
    fn from(err: TableError) -> Self {
        HandlerError::Table(err)
    }
}

impl From<StateError> for HandlerError {
    fn from(err: StateError) -> Self {
        HandlerError::State(err)
    }
}

impl From<ResultError> for HandlerError {
    fn from(err: ResultError) -> Self {
        HandlerError::Result(err)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::DecodeFailed(err.to_string())
    }
}

impl HandlerError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::UnknownCommand(_) => 404,
            HandlerError::DecodeFailed(_) => 400,
            HandlerError::Rejected(_) => 422,
            HandlerError::NotFound(_) => 404,
            HandlerError::Unauthorized(_) => 401,
            HandlerError::GuardRejected(_) => 400,
            HandlerError::Table(e) => table_status(e),
            HandlerError::State(_) => 500,
            HandlerError::Result(ResultError::Table(e)) => table_status(e),
            HandlerError::Result(ResultError::Compose(ComposeError::InvalidSelector(_))) => 400,
            HandlerError::Result(_) => 500,
            HandlerError::Other(_) => 500,
        }
    }
}

fn table_status(err: &TableError) -> u16 {
    match err {
        TableError::UnknownTable(_) | TableError::RowNotFound(_) => 404,
        TableError::UnknownColumn(_)
        | TableError::NotSortable(_)
        | TableError::InvalidRowKey(_)
        | TableError::Decode(_) => 400,
        TableError::Unsupported { .. } => 405,
        TableError::NoValueAccessor { .. } | TableError::Source(_) => 500,
    }
}
