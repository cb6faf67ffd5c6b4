//! ViewEngine - resolves a fragment name to a partial or a component.
//!
//! Resolution order for a name:
//! 1. partials, trying each search location in registration order
//!    (`{name}`, then `Shared/{name}`, then any added with [`ViewEngine::location`]);
//! 2. components registered under the bare name.
//!
//! If neither matches, rendering fails with [`RenderError::NotFound`] listing
//! every location tried. It never renders empty output for an unknown name.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::error::RenderError;

/// Built-in component rendering the hidden state-token field.
pub const STATE_TOKEN_COMPONENT: &str = "state-token";
/// Built-in component rendering an empty placeholder for removed elements.
pub const TOMBSTONE_COMPONENT: &str = "tombstone";

/// Partial template: model in, markup out.
pub type PartialFn = Arc<dyn Fn(&Value) -> Result<String, RenderError> + Send + Sync>;

/// Renders a named fragment against a model.
pub trait FragmentRenderer: Send + Sync {
    fn render(&self, name: &str, model: &Value) -> Result<String, RenderError>;
}

/// A self-contained component. Holds its own dependencies and may render
/// nested views through `views`.
pub trait Component: Send + Sync {
    fn render(&self, model: &Value, views: &dyn FragmentRenderer) -> Result<String, RenderError>;
}

pub struct ViewEngine {
    locations: Vec<String>,
    partials: HashMap<String, PartialFn>,
    components: HashMap<String, Arc<dyn Component>>,
}

impl Default for ViewEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewEngine {
    pub fn new() -> Self {
        let mut components: HashMap<String, Arc<dyn Component>> = HashMap::new();
        components.insert(STATE_TOKEN_COMPONENT.to_string(), Arc::new(StateTokenField));
        components.insert(TOMBSTONE_COMPONENT.to_string(), Arc::new(Tombstone));
        Self {
            locations: vec!["{name}".to_string(), "Shared/{name}".to_string()],
            partials: HashMap::new(),
            components,
        }
    }

    /// Add a search location pattern; `{name}` is replaced by the requested name.
    pub fn location(mut self, pattern: impl Into<String>) -> Self {
        self.locations.push(pattern.into());
        self
    }

    /// Register a partial template at a path.
    pub fn partial<F>(mut self, path: impl Into<String>, render: F) -> Self
    where
        F: Fn(&Value) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.partials.insert(path.into(), Arc::new(render));
        self
    }

    /// Register a component under a name.
    pub fn component<C: Component + 'static>(mut self, name: impl Into<String>, component: C) -> Self {
        self.components.insert(name.into(), Arc::new(component));
        self
    }

    fn candidates(&self, name: &str) -> Vec<String> {
        let mut paths: Vec<String> = Vec::with_capacity(self.locations.len());
        for pattern in &self.locations {
            let path = pattern.replace("{name}", name);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }
}

impl FragmentRenderer for ViewEngine {
    fn render(&self, name: &str, model: &Value) -> Result<String, RenderError> {
        let candidates = self.candidates(name);
        for path in &candidates {
            if let Some(partial) = self.partials.get(path) {
                return partial(model);
            }
        }
        if let Some(component) = self.components.get(name) {
            return component.render(model, self);
        }

        let mut searched = candidates;
        searched.push(format!("component:{}", name));
        Err(RenderError::NotFound {
            name: name.to_string(),
            searched,
        })
    }
}

/// Escape text for use in HTML content or a quoted attribute value.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<input type="hidden">` carrying a state token. Model: `{ "id", "token" }`.
struct StateTokenField;

impl Component for StateTokenField {
    fn render(&self, model: &Value, _views: &dyn FragmentRenderer) -> Result<String, RenderError> {
        let id = model["id"].as_str().ok_or_else(|| RenderError::Component {
            name: STATE_TOKEN_COMPONENT.to_string(),
            message: "missing 'id'".to_string(),
        })?;
        let token = model["token"].as_str().unwrap_or_default();
        Ok(format!(
            r#"<input type="hidden" id="{id}" name="{id}" value="{token}">"#,
            id = escape_html(id),
            token = escape_html(token)
        ))
    }
}

/// Empty `<div>` standing in for an element the client should drop. Model: `{ "id" }`.
struct Tombstone;

impl Component for Tombstone {
    fn render(&self, model: &Value, _views: &dyn FragmentRenderer) -> Result<String, RenderError> {
        let id = model["id"].as_str().unwrap_or_default();
        Ok(format!(r#"<div id="{}"></div>"#, escape_html(id)))
    }
}
