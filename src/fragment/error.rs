use std::error::Error;
use std::fmt;

/// Error type for fragment rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Nothing renderable under this name. Lists every location searched.
    NotFound { name: String, searched: Vec<String> },
    /// The model did not have the shape the view expected.
    Model(String),
    /// A component failed.
    Component { name: String, message: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotFound { name, searched } => write!(
                f,
                "view '{}' not found; searched: {}",
                name,
                searched.join(", ")
            ),
            RenderError::Model(msg) => write!(f, "view model error: {}", msg),
            RenderError::Component { name, message } => {
                write!(f, "component '{}' failed: {}", name, message)
            }
        }
    }
}

impl Error for RenderError {}

/// Error type for multi-fragment composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// A target selector contains characters outside the allow-list.
    InvalidSelector(String),
    /// A fragment failed to render.
    Render(RenderError),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::InvalidSelector(selector) => {
                write!(f, "invalid target selector: {:?}", selector)
            }
            ComposeError::Render(e) => write!(f, "render failed: {}", e),
        }
    }
}

impl Error for ComposeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ComposeError::Render(e) => Some(e),
            ComposeError::InvalidSelector(_) => None,
        }
    }
}

impl From<RenderError> for ComposeError {
    fn from(err: RenderError) -> Self {
        ComposeError::Render(err)
    }
}
