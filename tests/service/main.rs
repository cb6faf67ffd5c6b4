//! Service integration tests: table actions, state tokens and result kinds.

mod tables;
mod edit;
mod state;
mod convention;

#[cfg(feature = "http")]
mod http;
