use std::error::Error;
use std::fmt;

use crate::fragment::ComposeError;
use crate::state::StateError;
use crate::table::TableError;

use super::kind::ResultKind;

/// Error type for the result pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultError {
    /// A fragment-only marker hit a non-fragment request and no fallback view exists.
    FragmentOnly { kind: ResultKind },
    /// The marker never supports a full-page fallback.
    FallbackNotSupported { kind: ResultKind },
    /// The marker needs a table but the handler named none.
    MissingTable { kind: ResultKind },
    /// A full page was required but the handler produced no view.
    MissingView { kind: ResultKind },
    /// The navigation provider failed.
    Navigation(String),
    Table(TableError),
    State(StateError),
    Compose(ComposeError),
}

impl fmt::Display for ResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultError::FragmentOnly { kind } => write!(
                f,
                "{} result requires a fragment request; configure a fallback view",
                kind
            ),
            ResultError::FallbackNotSupported { kind } => {
                write!(f, "{} result does not support a full-page fallback", kind)
            }
            ResultError::MissingTable { kind } => {
                write!(f, "{} result requires a table", kind)
            }
            ResultError::MissingView { kind } => {
                write!(f, "{} result produced no view to render", kind)
            }
            ResultError::Navigation(msg) => write!(f, "navigation failed: {}", msg),
            ResultError::Table(e) => write!(f, "{}", e),
            ResultError::State(e) => write!(f, "{}", e),
            ResultError::Compose(e) => write!(f, "{}", e),
        }
    }
}

impl Error for ResultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ResultError::Table(e) => Some(e),
            ResultError::State(e) => Some(e),
            ResultError::Compose(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TableError> for ResultError {
    fn from(err: TableError) -> Self {
        ResultError::Table(err)
    }
}

impl From<StateError> for ResultError {
    fn from(err: StateError) -> Self {
        ResultError::State(err)
    }
}

impl From<ComposeError> for ResultError {
    fn from(err: ComposeError) -> Self {
        ResultError::Compose(err)
    }
}

impl ResultError {
    /// True for misconfiguration rather than bad input or runtime failure.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ResultError::FragmentOnly { .. }
                | ResultError::FallbackNotSupported { .. }
                | ResultError::MissingTable { .. }
                | ResultError::MissingView { .. }
                | ResultError::Table(TableError::NoValueAccessor { .. })
                | ResultError::Compose(ComposeError::Render(_))
        )
    }
}
