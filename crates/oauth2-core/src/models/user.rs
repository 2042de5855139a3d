use serde::{Deserialize, Serialize};
use crate::{document, hash_password, new_record_id, verify_password, OAuth2Error};

/// Resource owner as stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id", with = "document::object_id")]
    pub id: String,
    pub username: String,
    /// Argon2 PHC string. Legacy documents carry a plaintext `password`, which never verifies.
    #[serde(alias = "password")]
    pub password_hash: String,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: new_record_id(),
            username,
            password_hash,
        }
    }

    /// Build a user from a plaintext password, hashing it with Argon2.
    pub fn with_password(username: String, password: &str) -> Result<Self, OAuth2Error> {
        Ok(Self::new(username, hash_password(password)?))
    }

    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }
}
