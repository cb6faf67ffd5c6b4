//! swapped_rust - server-driven partial page updates.
//!
//! - [`table`]: type-erased tabular query pipeline (filter, sort, page) and view models.
//! - [`state`]: encrypted, versioned state that lives on the client between requests.
//! - [`fragment`]: named view rendering and out-of-band fragment composition.
//! - [`result`]: maps an action's outcome to the fragments it sends back.
//! - [`service`]: action registry, dispatch and (with `http`) an axum transport.

pub mod config;
pub mod fragment;
pub mod result;
pub mod service;
pub mod state;
pub mod table;

pub use config::{ConfigError, ServiceConfig};
pub use fragment::{Disposition, Fragment, FragmentRenderer, SwapComposer, ViewEngine};
pub use result::{ActionOutcome, Rendered, ResultKind, ResultPolicy};
pub use service::{Context, HandlerError, RequestHeaders, Service};
pub use state::{AesGcmProtector, DataProtector, LoadOutcome, StateStore};
pub use table::{CellValue, Column, InMemorySource, TableDef, TableRegistry, TableState};
