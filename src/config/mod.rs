pub use oauth2_config::*;
