//! Request headers forwarded into handlers and the result pipeline.

use std::collections::HashMap;

/// Header set by an upstream auth layer carrying the user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header set by an upstream auth layer carrying the user role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Lower-cased request headers.
///
/// Authentication happens upstream; the user id and role arrive as plain
/// headers:
///
/// ```json
/// {
///   "x-user-id": "user-42",
///   "x-user-role": "admin",
///   "hx-request": "true"
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    /// Header values keyed by lower-cased name.
    headers: HashMap<String, String>,
}

impl RequestHeaders {
    /// Create an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a map; names are lower-cased.
    pub fn from_map(headers: HashMap<String, String>) -> Self {
        Self {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
        }
    }

    /// Get the user ID set by the auth layer.
    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID_HEADER)
    }

    /// Get the user role set by the auth layer.
    pub fn role(&self) -> Option<&str> {
        self.get(USER_ROLE_HEADER)
    }

    /// Case-insensitive header lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Set a header, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
    }

    /// Builder form of [`RequestHeaders::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Check if a header is present.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// True when `header` is present with the value `true`.
    pub fn is_fragment_request(&self, header: &str) -> bool {
        self.get(header)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Get all headers, keyed by lower-cased name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}
