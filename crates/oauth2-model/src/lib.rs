//! Storage-backed implementation of [`oauth2_ports::OAuthModel`].

mod store_model;

pub use store_model::StoreModel;
