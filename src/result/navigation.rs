//! Navigation and auth-status models for the `Nav` and `AuthStatus` results.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

use crate::service::RequestHeaders;

/// Error returned by a navigation provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationError(pub String);

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NavigationError {}

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavNode {
    pub label: String,
    pub href: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavNode>,
    /// Only shown to requests carrying this role.
    #[serde(skip)]
    pub role: Option<String>,
}

impl NavNode {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            children: Vec::new(),
            role: None,
        }
    }

    pub fn child(mut self, node: NavNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn requires_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    fn visible_to(&self, role: Option<&str>) -> Option<NavNode> {
        if let Some(required) = &self.role {
            if role != Some(required.as_str()) {
                return None;
            }
        }
        Some(NavNode {
            label: self.label.clone(),
            href: self.href.clone(),
            children: self
                .children
                .iter()
                .filter_map(|c| c.visible_to(role))
                .collect(),
            role: self.role.clone(),
        })
    }
}

/// Builds navigation and auth-status models for the current request.
pub trait NavigationProvider: Send + Sync {
    fn navigation(&self, request: &RequestHeaders) -> Result<Vec<NavNode>, NavigationError>;

    fn auth_status(&self, request: &RequestHeaders) -> Value {
        json!({
            "authenticated": request.user_id().is_some(),
            "user_id": request.user_id(),
            "role": request.role(),
        })
    }
}

/// A fixed navigation tree filtered by the request's role.
#[derive(Debug, Clone, Default)]
pub struct StaticNavigation {
    nodes: Vec<NavNode>,
}

impl StaticNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, node: NavNode) -> Self {
        self.nodes.push(node);
        self
    }
}

impl NavigationProvider for StaticNavigation {
    fn navigation(&self, request: &RequestHeaders) -> Result<Vec<NavNode>, NavigationError> {
        let role = request.role();
        Ok(self.nodes.iter().filter_map(|n| n.visible_to(role)).collect())
    }
}
