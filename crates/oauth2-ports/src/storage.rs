use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use oauth2_core::{
    AccessTokenRecord, AuthorizationCodeRecord, ClientRecord, OAuth2Error, RefreshTokenRecord,
    User,
};

/// Document-store primitives the model adapter is built on.
///
/// Every lookup returns `Ok(None)` when nothing matches; `Err` is reserved for
/// backend failures and uniqueness violations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Initialize the backing store (e.g., verify connectivity / create indexes).
    async fn init(&self) -> Result<(), OAuth2Error>;

    // Users
    async fn insert_user(&self, user: &User) -> Result<(), OAuth2Error>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, OAuth2Error>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, OAuth2Error>;

    // Clients
    async fn insert_client(&self, client: &ClientRecord) -> Result<(), OAuth2Error>;
    /// Match on `client_id`, and on `client_secret` too when one is given.
    async fn find_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Option<ClientRecord>, OAuth2Error>;
    async fn find_client_by_id(&self, id: &str) -> Result<Option<ClientRecord>, OAuth2Error>;

    // Access tokens
    async fn insert_access_token(&self, token: &AccessTokenRecord) -> Result<(), OAuth2Error>;
    async fn find_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AccessTokenRecord>, OAuth2Error>;

    // Refresh tokens
    async fn insert_refresh_token(&self, token: &RefreshTokenRecord) -> Result<(), OAuth2Error>;
    async fn find_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, OAuth2Error>;
    /// Returns whether a record was removed.
    async fn delete_refresh_token(&self, refresh_token: &str) -> Result<bool, OAuth2Error>;

    // Authorization codes
    async fn insert_authorization_code(
        &self,
        code: &AuthorizationCodeRecord,
    ) -> Result<(), OAuth2Error>;
    async fn find_authorization_code(
        &self,
        code: &str,
    ) -> Result<Option<AuthorizationCodeRecord>, OAuth2Error>;
    /// Overwrite the stored expiry. Returns whether a record matched.
    async fn expire_authorization_code(
        &self,
        code: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, OAuth2Error>;

    /// Lightweight liveness/readiness check.
    ///
    /// Implementations may override to do something cheaper than `init()`.
    async fn healthcheck(&self) -> Result<(), OAuth2Error> {
        self.init().await
    }
}

pub type DynRecordStore = Arc<dyn RecordStore>;
