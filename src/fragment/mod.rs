//! Fragment - named view rendering and the multi-fragment response protocol.
//!
//! A response body is one optional main fragment, written as-is, followed by
//! any number of out-of-band fragments. Each OOB fragment carries a DOM patch
//! directive (`hx-swap-oob="{disposition}[:{selector}]"`) on its root element.
//!
//! ## Example
//!
//! ```ignore
//! use swapped_rust::fragment::{Disposition, Fragment, SwapComposer, ViewEngine};
//!
//! let views = Arc::new(ViewEngine::new().partial("People/Row", render_row));
//! let composer = SwapComposer::new(views);
//! let body = composer.compose(
//!     Some(&Fragment::main("People/Detail", detail)),
//!     &[Fragment::oob("People/Row", row, Disposition::OuterHtml)],
//! )?;
//! ```

mod composer;
mod descriptor;
mod error;
mod renderer;

pub use composer::{inject_directive, wrap_oob, SwapComposer, SWAP_OOB_ATTR};
pub use descriptor::{validate_selector, Disposition, Fragment};
pub use error::{ComposeError, RenderError};
pub use renderer::{
    escape_html, Component, FragmentRenderer, PartialFn, ViewEngine, STATE_TOKEN_COMPONENT,
    TOMBSTONE_COMPONENT,
};
