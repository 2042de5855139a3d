pub use oauth2_core::*;
