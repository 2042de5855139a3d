use async_trait::async_trait;

use oauth2_core::{
    revoked_at, AccessToken, AccessTokenRecord, AuthorizationCode, AuthorizationCodeRecord,
    Client, NewAuthorizationCode, NewToken, OAuth2Error, RefreshToken, RefreshTokenRecord, Token,
    User,
};
use oauth2_ports::{DynRecordStore, OAuthModel};

/// Implements the protocol engine's model callbacks on top of a [`RecordStore`].
///
/// Each callback is one store round trip plus population of the referenced
/// client and user. Backend errors are logged and returned to the caller.
///
/// [`RecordStore`]: oauth2_ports::RecordStore
pub struct StoreModel {
    store: DynRecordStore,
}

impl StoreModel {
    pub fn new(store: DynRecordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DynRecordStore {
        &self.store
    }

    /// Resolve the client and user a token or code refers to.
    ///
    /// A reference to a missing document makes the whole record unusable.
    async fn populate(
        &self,
        client_id: &str,
        user_id: &str,
    ) -> Result<Option<(Client, User)>, OAuth2Error> {
        let (client, user) = futures::try_join!(
            self.store.find_client_by_id(client_id),
            self.store.find_user_by_id(user_id)
        )?;

        match (client, user) {
            (Some(client), Some(user)) => Ok(Some((Client::from(client), user))),
            (client, user) => {
                tracing::warn!(
                    client_id,
                    user_id,
                    client_found = client.is_some(),
                    user_found = user.is_some(),
                    "record references a missing client or user"
                );
                Ok(None)
            }
        }
    }

    fn prefix(secret: &str) -> String {
        secret.chars().take(12).collect::<String>()
    }
}

fn logged(operation: &'static str) -> impl Fn(OAuth2Error) -> OAuth2Error {
    move |err| {
        tracing::error!(operation, error = %err, "storage call failed");
        err
    }
}

#[async_trait]
impl OAuthModel for StoreModel {
    async fn get_access_token(
        &self,
        bearer_token: &str,
    ) -> Result<Option<AccessToken>, OAuth2Error> {
        tracing::debug!(token_prefix = %Self::prefix(bearer_token), "get_access_token");

        let Some(record) = self
            .store
            .find_access_token(bearer_token)
            .await
            .map_err(logged("get_access_token"))?
        else {
            return Ok(None);
        };

        let populated = self
            .populate(&record.client_id, &record.user_id)
            .await
            .map_err(logged("get_access_token"))?;

        Ok(populated.map(|(client, user)| AccessToken::from_record(record, client, user)))
    }

    async fn get_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Option<Client>, OAuth2Error> {
        tracing::debug!(client_id, with_secret = client_secret.is_some(), "get_client");

        let client_secret = client_secret.filter(|s| !s.is_empty());
        let record = self
            .store
            .find_client(client_id, client_secret)
            .await
            .map_err(logged("get_client"))?;

        Ok(record.map(Client::from))
    }

    async fn get_user(&self, username: &str, password: &str) -> Result<Option<User>, OAuth2Error> {
        tracing::debug!(username, "get_user");

        let Some(user) = self
            .store
            .find_user_by_username(username)
            .await
            .map_err(logged("get_user"))?
        else {
            return Ok(None);
        };

        // Argon2 is CPU-bound; keep it off the async workers.
        let password = password.to_string();
        let verified =
            tokio::task::spawn_blocking(move || user.verify_password(&password).then_some(user))
                .await
                .map_err(|e| OAuth2Error::server_error(&format!("password check aborted: {e}")))
                .map_err(logged("get_user"))?;

        Ok(verified)
    }

    async fn revoke_authorization_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<AuthorizationCode, OAuth2Error> {
        tracing::debug!(code_prefix = %Self::prefix(&code.code), "revoke_authorization_code");

        let matched = self
            .store
            .expire_authorization_code(&code.code, revoked_at())
            .await
            .map_err(logged("revoke_authorization_code"))?;

        if !matched {
            tracing::debug!(
                code_prefix = %Self::prefix(&code.code),
                "authorization code to revoke was not stored"
            );
        }

        Ok(code.revoked())
    }

    async fn revoke_token(&self, token: &RefreshToken) -> Result<RefreshToken, OAuth2Error> {
        tracing::debug!(token_prefix = %Self::prefix(&token.refresh_token), "revoke_token");

        let deleted = self
            .store
            .delete_refresh_token(&token.refresh_token)
            .await
            .map_err(logged("revoke_token"))?;

        if !deleted {
            tracing::debug!(
                token_prefix = %Self::prefix(&token.refresh_token),
                "refresh token to revoke was not stored"
            );
        }

        Ok(token.revoked())
    }

    async fn save_token(
        &self,
        token: &NewToken,
        client: &Client,
        user: &User,
    ) -> Result<Token, OAuth2Error> {
        tracing::debug!(
            token_prefix = %Self::prefix(&token.access_token),
            client_id = %client.client_id,
            user_id = %user.id,
            has_refresh_token = token.refresh_token.is_some(),
            "save_token"
        );

        let access = AccessTokenRecord::new(token, &client.id, &user.id);
        // No refresh component for client-credentials grants.
        let refresh = RefreshTokenRecord::new(token, &client.id, &user.id);

        futures::try_join!(self.store.insert_access_token(&access), async {
            match &refresh {
                Some(refresh) => self.store.insert_refresh_token(refresh).await,
                None => Ok(()),
            }
        })
        .map_err(logged("save_token"))?;

        Ok(Token::new(token.clone(), client.clone(), user.clone()))
    }

    async fn get_authorization_code(
        &self,
        code: &str,
    ) -> Result<Option<AuthorizationCode>, OAuth2Error> {
        tracing::debug!(code_prefix = %Self::prefix(code), "get_authorization_code");

        let Some(record) = self
            .store
            .find_authorization_code(code)
            .await
            .map_err(logged("get_authorization_code"))?
        else {
            return Ok(None);
        };

        let populated = self
            .populate(&record.client_id, &record.user_id)
            .await
            .map_err(logged("get_authorization_code"))?;

        Ok(populated.map(|(client, user)| AuthorizationCode::from_record(record, client, user)))
    }

    async fn save_authorization_code(
        &self,
        code: &NewAuthorizationCode,
        client: &Client,
        user: &User,
    ) -> Result<AuthorizationCode, OAuth2Error> {
        tracing::debug!(
            code_prefix = %Self::prefix(&code.authorization_code),
            client_id = %client.client_id,
            user_id = %user.id,
            "save_authorization_code"
        );

        let record = AuthorizationCodeRecord::new(code, &client.id, &user.id);
        self.store
            .insert_authorization_code(&record)
            .await
            .map_err(logged("save_authorization_code"))?;

        Ok(AuthorizationCode::new(code.clone(), client.clone(), user.clone()))
    }

    async fn get_user_from_client(&self, client: &Client) -> Result<Option<User>, OAuth2Error> {
        tracing::debug!(client_id = %client.client_id, "get_user_from_client");

        let client_secret = client.client_secret.as_deref().filter(|s| !s.is_empty());
        let Some(record) = self
            .store
            .find_client(&client.client_id, client_secret)
            .await
            .map_err(logged("get_user_from_client"))?
        else {
            return Ok(None);
        };

        let Some(user_id) = record.user_id else {
            return Ok(None);
        };

        let user = self
            .store
            .find_user_by_id(&user_id)
            .await
            .map_err(logged("get_user_from_client"))?;

        if user.is_none() {
            tracing::warn!(
                client_id = %client.client_id,
                user_id = %user_id,
                "client references a missing owning user"
            );
        }

        Ok(user)
    }

    async fn get_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshToken>, OAuth2Error> {
        // Engines hand over a stringified missing value on some grant paths.
        if refresh_token.is_empty() || refresh_token == "undefined" {
            return Ok(None);
        }

        tracing::debug!(token_prefix = %Self::prefix(refresh_token), "get_refresh_token");

        let Some(record) = self
            .store
            .find_refresh_token(refresh_token)
            .await
            .map_err(logged("get_refresh_token"))?
        else {
            return Ok(None);
        };

        let populated = self
            .populate(&record.client_id, &record.user_id)
            .await
            .map_err(logged("get_refresh_token"))?;

        Ok(populated.map(|(client, user)| RefreshToken::from_record(record, client, user)))
    }
}
