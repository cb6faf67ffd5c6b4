//! Result - maps an action's outcome to the fragments it sends back.
//!
//! | Kind         | Fragment request                                         | Otherwise         |
//! |--------------|----------------------------------------------------------|-------------------|
//! | `Content`    | main view                                                | main view as page |
//! | `Edit`       | changed rows, action list, edit toggle                   | fallback or error |
//! | `Refresh`    | table body, header, pagination, action list, edit toggle | fallback or error |
//! | `Nav`        | main view, navigation                                    | fallback or error |
//! | `AuthStatus` | navigation, auth status                                  | always an error   |
//!
//! Every changed state store adds its hidden token field as a final
//! out-of-band fragment.

mod error;
mod kind;
mod navigation;
mod pipeline;

pub use error::ResultError;
pub use kind::{ActionOutcome, Fallback, ResultKind, ResultPolicy};
pub use navigation::{NavNode, NavigationError, NavigationProvider, StaticNavigation};
pub use pipeline::{stored_editing, stored_table_state, Rendered, ResultPipeline, STATE_TOKENS_FIELD};
