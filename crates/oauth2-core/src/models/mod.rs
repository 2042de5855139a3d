pub mod authorization;
pub mod client;
pub mod document;
pub mod error;
pub mod password;
pub mod scope;
pub mod token;
pub mod user;

pub use authorization::*;
pub use client::*;
pub use document::new_record_id;
pub use error::*;
pub use password::*;
pub use scope::*;
pub use token::*;
pub use user::*;
