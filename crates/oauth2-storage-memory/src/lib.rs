use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use oauth2_core::{
    AccessTokenRecord, AuthorizationCodeRecord, ClientRecord, OAuth2Error, RefreshTokenRecord,
    User,
};
use oauth2_ports::RecordStore;

/// In-process storage implementation.
///
/// Notes:
/// - Each collection is a map keyed by the same field MongoDB indexes as unique,
///   so duplicate inserts fail the same way on both backends.
/// - Nothing survives a restart; intended for tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    clients: RwLock<HashMap<String, ClientRecord>>,
    access_tokens: RwLock<HashMap<String, AccessTokenRecord>>,
    refresh_tokens: RwLock<HashMap<String, RefreshTokenRecord>>,
    authorization_codes: RwLock<HashMap<String, AuthorizationCodeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored access and refresh tokens.
    pub async fn token_counts(&self) -> (usize, usize) {
        let access = self.access_tokens.read().await.len();
        let refresh = self.refresh_tokens.read().await.len();
        (access, refresh)
    }

    async fn insert_unique<T: Clone>(
        map: &RwLock<HashMap<String, T>>,
        key: &str,
        value: &T,
    ) -> Result<(), OAuth2Error> {
        let mut guard = map.write().await;
        if guard.contains_key(key) {
            return Err(OAuth2Error::invalid_request("duplicate key"));
        }
        guard.insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn init(&self) -> Result<(), OAuth2Error> {
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), OAuth2Error> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.id == user.id) {
            return Err(OAuth2Error::invalid_request("duplicate key"));
        }
        if users.contains_key(&user.username) {
            return Err(OAuth2Error::invalid_request("duplicate key"));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, OAuth2Error> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, OAuth2Error> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<(), OAuth2Error> {
        Self::insert_unique(&self.clients, &client.client_id, client).await
    }

    async fn find_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Option<ClientRecord>, OAuth2Error> {
        let clients = self.clients.read().await;
        Ok(clients
            .get(client_id)
            .filter(|c| client_secret.is_none() || c.client_secret.as_deref() == client_secret)
            .cloned())
    }

    async fn find_client_by_id(&self, id: &str) -> Result<Option<ClientRecord>, OAuth2Error> {
        let clients = self.clients.read().await;
        Ok(clients.values().find(|c| c.id == id).cloned())
    }

    async fn insert_access_token(&self, token: &AccessTokenRecord) -> Result<(), OAuth2Error> {
        Self::insert_unique(&self.access_tokens, &token.access_token, token).await
    }

    async fn find_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AccessTokenRecord>, OAuth2Error> {
        Ok(self.access_tokens.read().await.get(access_token).cloned())
    }

    async fn insert_refresh_token(&self, token: &RefreshTokenRecord) -> Result<(), OAuth2Error> {
        Self::insert_unique(&self.refresh_tokens, &token.refresh_token, token).await
    }

    async fn find_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, OAuth2Error> {
        Ok(self.refresh_tokens.read().await.get(refresh_token).cloned())
    }

    async fn delete_refresh_token(&self, refresh_token: &str) -> Result<bool, OAuth2Error> {
        Ok(self
            .refresh_tokens
            .write()
            .await
            .remove(refresh_token)
            .is_some())
    }

    async fn insert_authorization_code(
        &self,
        code: &AuthorizationCodeRecord,
    ) -> Result<(), OAuth2Error> {
        Self::insert_unique(&self.authorization_codes, &code.authorization_code, code).await
    }

    async fn find_authorization_code(
        &self,
        code: &str,
    ) -> Result<Option<AuthorizationCodeRecord>, OAuth2Error> {
        Ok(self.authorization_codes.read().await.get(code).cloned())
    }

    async fn expire_authorization_code(
        &self,
        code: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, OAuth2Error> {
        let mut codes = self.authorization_codes.write().await;
        match codes.get_mut(code) {
            Some(record) => {
                record.expires = Some(expires);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
