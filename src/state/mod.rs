//! State - versioned, encrypted, partitioned client-held state.
//!
//! A [`StateStore`] is hydrated from a request token, mutated by the handler,
//! and, if dirty, re-encrypted into a fresh token for the response. Each
//! logical store has its own key-derivation purpose (`PageState`,
//! `GlobalState`), so their tokens are not interchangeable.

mod error;
mod protector;
mod store;

pub use error::{ProtectError, StateError};
pub use protector::{AesGcmProtector, DataProtector};
pub use store::{
    LoadOutcome, StateStore, GLOBAL_STATE_PURPOSE, META_PARTITION, PAGE_STATE_PURPOSE,
};
