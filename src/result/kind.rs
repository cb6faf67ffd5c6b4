//! Action markers and what a handler hands back to the result pipeline.

use std::fmt;

use serde_json::Value;

use super::error::ResultError;

/// Which fragment set an action produces on a fragment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    /// Only the handler's own view, in the main slot.
    Content,
    /// Changed rows plus the table's action list and edit toggle.
    Edit,
    /// The whole table: body, header, pagination, action list, edit toggle.
    Refresh,
    /// The handler's view plus rebuilt navigation.
    Nav,
    /// Rebuilt navigation and auth status. Never renders a full page.
    AuthStatus,
}

impl ResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultKind::Content => "content",
            ResultKind::Edit => "edit",
            ResultKind::Refresh => "refresh",
            ResultKind::Nav => "nav",
            ResultKind::AuthStatus => "auth-status",
        }
    }

    pub fn supports_fallback(self) -> bool {
        !matches!(self, ResultKind::AuthStatus)
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full-page view used when the request is not fragment-capable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    None,
    View(String),
    /// The page view of the table named in the outcome.
    TablePage,
}

/// A marker plus its full-page fallback, fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPolicy {
    kind: ResultKind,
    fallback: Fallback,
}

impl ResultPolicy {
    pub fn new(kind: ResultKind) -> Self {
        Self {
            kind,
            fallback: Fallback::None,
        }
    }

    pub fn content() -> Self {
        Self::new(ResultKind::Content)
    }

    pub fn edit() -> Self {
        Self::new(ResultKind::Edit)
    }

    pub fn refresh() -> Self {
        Self::new(ResultKind::Refresh)
    }

    pub fn nav() -> Self {
        Self::new(ResultKind::Nav)
    }

    pub fn auth_status() -> Self {
        Self::new(ResultKind::AuthStatus)
    }

    /// Render `view` as a full page for non-fragment requests.
    pub fn with_fallback(self, view: impl Into<String>) -> Result<Self, ResultError> {
        self.fallback_to(Fallback::View(view.into()))
    }

    /// Render the outcome table's page view for non-fragment requests.
    pub fn with_table_page_fallback(self) -> Result<Self, ResultError> {
        self.fallback_to(Fallback::TablePage)
    }

    /// `kind` falling back to the table page; only for kinds that allow it.
    pub(crate) fn table_page(kind: ResultKind) -> Self {
        debug_assert!(kind.supports_fallback());
        Self {
            kind,
            fallback: Fallback::TablePage,
        }
    }

    fn fallback_to(mut self, fallback: Fallback) -> Result<Self, ResultError> {
        if !self.kind.supports_fallback() {
            return Err(ResultError::FallbackNotSupported { kind: self.kind });
        }
        self.fallback = fallback;
        Ok(self)
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }
}

/// What a handler produced: an optional main view and the table / rows it touched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionOutcome {
    pub view: Option<String>,
    pub model: Value,
    pub table: Option<String>,
    pub changed_rows: Vec<String>,
}

impl ActionOutcome {
    /// Nothing to render in the main slot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Render `view` with `model` in the main slot.
    pub fn view(view: impl Into<String>, model: Value) -> Self {
        Self {
            view: Some(view.into()),
            model,
            ..Self::default()
        }
    }

    /// The handler touched the table `type_id`.
    pub fn table(type_id: impl Into<String>) -> Self {
        Self {
            table: Some(type_id.into()),
            ..Self::default()
        }
    }

    /// The handler changed specific rows (serialized keys) of `type_id`.
    pub fn rows<I, S>(type_id: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: Some(type_id.into()),
            changed_rows: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_view(mut self, view: impl Into<String>, model: Value) -> Self {
        self.view = Some(view.into());
        self.model = model;
        self
    }
}
