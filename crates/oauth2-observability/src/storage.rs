use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::Instrument;

use oauth2_core::{
    AccessTokenRecord, AuthorizationCodeRecord, ClientRecord, OAuth2Error, RefreshTokenRecord,
    User,
};
use oauth2_ports::{DynRecordStore, RecordStore};

/// A thin wrapper around a `DynRecordStore` that creates a tracing span for each store call.
///
/// Token and code values are never recorded in full, only a short prefix and
/// their length.
pub struct ObservedStore {
    inner: DynRecordStore,
    db_system: String,
}

impl ObservedStore {
    pub fn new(inner: DynRecordStore, db_system: String) -> Self {
        Self { inner, db_system }
    }

    pub fn db_system(&self) -> &str {
        &self.db_system
    }

    fn span(&self, operation: &'static str) -> tracing::Span {
        tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = operation
        )
    }

    fn secret_span(&self, operation: &'static str, secret: &str) -> tracing::Span {
        tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = operation,
            token_prefix = %Self::token_prefix(secret),
            token_len = secret.len()
        )
    }

    fn token_prefix(token: &str) -> String {
        token.chars().take(12).collect::<String>()
    }
}

#[async_trait]
impl RecordStore for ObservedStore {
    async fn init(&self) -> Result<(), OAuth2Error> {
        let span = self.span("init");
        async move { self.inner.init().await }
            .instrument(span)
            .await
    }

    async fn insert_user(&self, user: &User) -> Result<(), OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "insert_user",
            user_id = %user.id,
            username = %user.username
        );
        async move { self.inner.insert_user(user).await }
            .instrument(span)
            .await
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "find_user_by_id",
            user_id = %id
        );
        async move { self.inner.find_user_by_id(id).await }
            .instrument(span)
            .await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "find_user_by_username",
            username = %username
        );
        async move { self.inner.find_user_by_username(username).await }
            .instrument(span)
            .await
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<(), OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "insert_client",
            client_id = %client.client_id
        );
        async move { self.inner.insert_client(client).await }
            .instrument(span)
            .await
    }

    async fn find_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Option<ClientRecord>, OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "find_client",
            client_id = %client_id,
            with_secret = client_secret.is_some()
        );
        async move { self.inner.find_client(client_id, client_secret).await }
            .instrument(span)
            .await
    }

    async fn find_client_by_id(&self, id: &str) -> Result<Option<ClientRecord>, OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "find_client_by_id",
            id = %id
        );
        async move { self.inner.find_client_by_id(id).await }
            .instrument(span)
            .await
    }

    async fn insert_access_token(&self, token: &AccessTokenRecord) -> Result<(), OAuth2Error> {
        // Never log full tokens.
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "insert_access_token",
            token_prefix = %Self::token_prefix(&token.access_token),
            client_ref = %token.client_id,
            user_ref = %token.user_id
        );
        async move { self.inner.insert_access_token(token).await }
            .instrument(span)
            .await
    }

    async fn find_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AccessTokenRecord>, OAuth2Error> {
        let span = self.secret_span("find_access_token", access_token);
        async move { self.inner.find_access_token(access_token).await }
            .instrument(span)
            .await
    }

    async fn insert_refresh_token(&self, token: &RefreshTokenRecord) -> Result<(), OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "insert_refresh_token",
            token_prefix = %Self::token_prefix(&token.refresh_token),
            client_ref = %token.client_id,
            user_ref = %token.user_id
        );
        async move { self.inner.insert_refresh_token(token).await }
            .instrument(span)
            .await
    }

    async fn find_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, OAuth2Error> {
        let span = self.secret_span("find_refresh_token", refresh_token);
        async move { self.inner.find_refresh_token(refresh_token).await }
            .instrument(span)
            .await
    }

    async fn delete_refresh_token(&self, refresh_token: &str) -> Result<bool, OAuth2Error> {
        let span = self.secret_span("delete_refresh_token", refresh_token);
        async move { self.inner.delete_refresh_token(refresh_token).await }
            .instrument(span)
            .await
    }

    async fn insert_authorization_code(
        &self,
        code: &AuthorizationCodeRecord,
    ) -> Result<(), OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            db_system = %self.db_system,
            db_operation = "insert_authorization_code",
            code_prefix = %Self::token_prefix(&code.authorization_code),
            client_ref = %code.client_id,
            user_ref = %code.user_id
        );
        async move { self.inner.insert_authorization_code(code).await }
            .instrument(span)
            .await
    }

    async fn find_authorization_code(
        &self,
        code: &str,
    ) -> Result<Option<AuthorizationCodeRecord>, OAuth2Error> {
        let span = self.secret_span("find_authorization_code", code);
        async move { self.inner.find_authorization_code(code).await }
            .instrument(span)
            .await
    }

    async fn expire_authorization_code(
        &self,
        code: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, OAuth2Error> {
        let span = self.secret_span("expire_authorization_code", code);
        async move { self.inner.expire_authorization_code(code, expires).await }
            .instrument(span)
            .await
    }

    async fn healthcheck(&self) -> Result<(), OAuth2Error> {
        let span = self.span("healthcheck");
        async move { self.inner.healthcheck().await }
            .instrument(span)
            .await
    }
}
