use async_trait::async_trait;
use std::sync::Arc;

use oauth2_core::{
    validate_scopes, AccessToken, AuthorizationCode, Client, NewAuthorizationCode, NewToken,
    OAuth2Error, RefreshToken, Token, User,
};

/// Storage callbacks required by an OAuth2 protocol engine.
///
/// Lookups follow one convention: `Ok(Some(_))` on success, `Ok(None)` when
/// nothing matches (or credentials do not validate), `Err` when the backend
/// failed. The engine maps `Ok(None)` onto `invalid_grant` / `invalid_client`
/// itself.
#[async_trait]
pub trait OAuthModel: Send + Sync {
    /// Resolve a bearer token presented on an API call.
    async fn get_access_token(&self, bearer_token: &str)
        -> Result<Option<AccessToken>, OAuth2Error>;

    /// Look a client up by id, and by secret too when the engine supplies one.
    async fn get_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Option<Client>, OAuth2Error>;

    /// Password grant: the user iff `password` matches the stored hash.
    async fn get_user(&self, username: &str, password: &str)
        -> Result<Option<User>, OAuth2Error>;

    /// Expire a used authorization code in storage.
    async fn revoke_authorization_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<AuthorizationCode, OAuth2Error>;

    /// Remove a refresh token from storage. The returned copy is always expired.
    async fn revoke_token(&self, token: &RefreshToken) -> Result<RefreshToken, OAuth2Error>;

    async fn save_token(
        &self,
        token: &NewToken,
        client: &Client,
        user: &User,
    ) -> Result<Token, OAuth2Error>;

    async fn get_authorization_code(
        &self,
        code: &str,
    ) -> Result<Option<AuthorizationCode>, OAuth2Error>;

    async fn save_authorization_code(
        &self,
        code: &NewAuthorizationCode,
        client: &Client,
        user: &User,
    ) -> Result<AuthorizationCode, OAuth2Error>;

    /// Client-credentials grant: the user that owns `client`.
    async fn get_user_from_client(&self, client: &Client) -> Result<Option<User>, OAuth2Error>;

    async fn get_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshToken>, OAuth2Error>;

    /// Returns the requested scope when every entry is registered for `client`.
    ///
    /// A client without a registered scope accepts any request. A request with
    /// no scope is granted the client's registered scope, if it has one.
    fn validate_scope(&self, _user: &User, client: &Client, scope: Option<&str>) -> Option<String> {
        let requested = scope.filter(|s| !s.trim().is_empty());
        match (requested, client.scope.as_deref()) {
            (None, registered) => registered.map(str::to_string),
            (Some(requested), Some(available)) if !validate_scopes(requested, available) => None,
            (Some(requested), _) => Some(requested.to_string()),
        }
    }

    /// Strict comparison of the token's scope with the scope a resource requires.
    fn verify_scope(&self, token: &AccessToken, scope: &str) -> bool {
        token.scope.as_deref() == Some(scope)
    }
}

pub type DynModel = Arc<dyn OAuthModel>;
