//! Service - convention-based action registry for server-driven UIs.
//!
//! Register actions on a [`Service`], each with a [`ResultPolicy`] naming
//! which fragments it produces. A handler receives a [`Context`] with the
//! input, request headers, both state stores and the table registry, and
//! returns an [`ActionOutcome`].
//!
//! ## Handler Convention
//!
//! ```ignore
//! // src/actions/people_promote.rs
//!
//! pub const ACTION: &str = "people.promote";
//!
//! pub fn policy() -> ResultPolicy {
//!     ResultPolicy::edit()
//! }
//!
//! pub fn guard(ctx: &Context<'_>) -> bool {
//!     ctx.has_fields(&["key"])
//! }
//!
//! pub fn handle(ctx: &mut Context<'_>) -> Result<ActionOutcome, HandlerError> {
//!     let key: String = ctx.field("key")?;
//!     promote(&key)?;
//!     Ok(ActionOutcome::rows("people", [key]))
//! }
//! ```
//!
//! [`ResultPolicy`]: crate::result::ResultPolicy
//! [`ActionOutcome`]: crate::result::ActionOutcome

mod context;
mod dispatch;
mod error;
pub mod input;
mod request;
pub mod table_actions;

pub use context::Context;
pub use dispatch::Service;
pub use error::HandlerError;
pub use request::{RequestHeaders, USER_ID_HEADER, USER_ROLE_HEADER};

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{router, serve};

/// Register action modules with a service using the convention pattern.
///
/// Each module must export:
/// - `ACTION: &str` - the action name
/// - `policy() -> ResultPolicy` - which fragments the action produces
/// - `guard(ctx) -> bool` - input validation
/// - `handle(ctx) -> Result<ActionOutcome, HandlerError>` - the handler
///
/// # Example
/// ```ignore
/// let service = swapped_rust::register_actions!(
///     Service::new(config, protector, views),
///     actions::people_promote,
///     actions::people_archive,
/// );
/// ```
#[macro_export]
macro_rules! register_actions {
    ($service:expr, $( $($seg:ident)::+ ),+ $(,)?) => {
        $service
        $(
            .action_guarded(
                $($seg)::+::ACTION,
                $($seg)::+::policy(),
                $($seg)::+::guard,
                $($seg)::+::handle,
            )
        )+
    };
}
