//! Library exports.
//!
//! The adapter itself lives in the extracted crates under `crates/`; this crate
//! re-exports them under stable module paths so an embedding application (and
//! the integration tests) only needs one dependency.

pub mod config;
pub mod models;
pub mod storage;
pub mod telemetry;

pub use oauth2_model::StoreModel;
pub use oauth2_ports::{DynModel, OAuthModel};
