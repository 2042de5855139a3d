//! Integration ports for the OAuth2 model adapter.
//!
//! `OAuthModel` is what a protocol engine calls; `RecordStore` is what a
//! document database has to provide. Implement either in your own crate to plug
//! in a different engine or backend without forking.

pub mod model;
pub mod storage;

pub use model::*;
pub use storage::*;
