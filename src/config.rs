//! Service configuration.
//!
//! Defaults work out of the box for htmx clients; `from_env` overlays
//! `SWAPPED_*` environment variables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::AesGcmProtector;

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub name: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration {}: {}", self.name, self.message)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Request/response header carrying the page-scoped state token.
    pub page_state_header: String,
    /// Request/response header carrying the global state token.
    pub global_state_header: String,
    /// Header whose value `true` marks a fragment-capable request.
    pub fragment_request_header: String,
    /// DOM id of the hidden field holding the page state token.
    pub page_state_element: String,
    /// DOM id of the hidden field holding the global state token.
    pub global_state_element: String,
    pub navigation_view: String,
    pub navigation_target: String,
    pub auth_status_view: String,
    pub auth_status_target: String,
    /// Standard-base64 master key (>= 32 bytes) for state tokens.
    #[serde(skip_serializing)]
    pub state_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            page_state_header: "x-page-state".to_string(),
            global_state_header: "x-global-state".to_string(),
            fragment_request_header: "hx-request".to_string(),
            page_state_element: "page-state".to_string(),
            global_state_element: "global-state".to_string(),
            navigation_view: "Shared/Navigation".to_string(),
            navigation_target: "#navigation".to_string(),
            auth_status_view: "Shared/AuthStatus".to_string(),
            auth_status_target: "#auth-status".to_string(),
            state_key: None,
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(key) = env_string("SWAPPED_STATE_KEY") {
            AesGcmProtector::from_base64(&key).map_err(|e| ConfigError {
                name: "SWAPPED_STATE_KEY".to_string(),
                message: e.to_string(),
            })?;
            config.state_key = Some(key);
        }
        if let Some(header) = env_header("SWAPPED_PAGE_STATE_HEADER")? {
            config.page_state_header = header;
        }
        if let Some(header) = env_header("SWAPPED_GLOBAL_STATE_HEADER")? {
            config.global_state_header = header;
        }
        if let Some(header) = env_header("SWAPPED_FRAGMENT_HEADER")? {
            config.fragment_request_header = header;
        }

        Ok(config)
    }

    /// Build the data protector from `state_key`. Without a key, tokens are
    /// sealed with a random per-process key and do not survive a restart.
    pub fn protector(&self) -> Result<AesGcmProtector, ConfigError> {
        match &self.state_key {
            Some(key) => AesGcmProtector::from_base64(key).map_err(|e| ConfigError {
                name: "state_key".to_string(),
                message: e.to_string(),
            }),
            None => {
                tracing::warn!("no state key configured; using an ephemeral key");
                Ok(AesGcmProtector::ephemeral())
            }
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_header(name: &str) -> Result<Option<String>, ConfigError> {
    let Some(value) = env_string(name) else {
        return Ok(None);
    };
    validate_header_name(&value).map_err(|message| ConfigError {
        name: name.to_string(),
        message,
    })?;
    Ok(Some(value.to_ascii_lowercase()))
}

fn validate_header_name(value: &str) -> Result<(), String> {
    if value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        Ok(())
    } else {
        Err(format!("{:?} is not a valid header name", value))
    }
}
