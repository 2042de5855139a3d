//! Framework-agnostic domain types shared by the OAuth2 model adapter, its
//! storage backends and the protocol engine integration.

pub mod models;

pub use models::*;
