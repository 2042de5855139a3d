use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{document, new_record_id, Client, User};

/// Expiry stamped onto revoked refresh tokens and authorization codes.
pub fn revoked_at() -> DateTime<Utc> {
    // 2015-05-28T06:59:53Z
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_432_796_393)
}

/// Access token document (`oauthaccesstokens`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenRecord {
    #[serde(rename = "_id", with = "document::object_id")]
    pub id: String,
    pub access_token: String,
    #[serde(default, with = "document::datetime_optional")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(rename = "OAuthClient", with = "document::object_id")]
    pub client_id: String,
    #[serde(rename = "User", with = "document::object_id")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl AccessTokenRecord {
    pub fn new(token: &NewToken, client_id: &str, user_id: &str) -> Self {
        Self {
            id: new_record_id(),
            access_token: token.access_token.clone(),
            expires: token.access_token_expires_at,
            client_id: client_id.to_string(),
            user_id: user_id.to_string(),
            scope: token.scope.clone(),
        }
    }
}

/// Refresh token document (`oauthrefreshtokens`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    #[serde(rename = "_id", with = "document::object_id")]
    pub id: String,
    pub refresh_token: String,
    #[serde(default, with = "document::datetime_optional")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(rename = "OAuthClient", with = "document::object_id")]
    pub client_id: String,
    #[serde(rename = "User", with = "document::object_id")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl RefreshTokenRecord {
    /// Returns `None` for client-credentials style tokens that carry no refresh component.
    pub fn new(token: &NewToken, client_id: &str, user_id: &str) -> Option<Self> {
        let refresh_token = token.refresh_token.clone()?;
        Some(Self {
            id: new_record_id(),
            refresh_token,
            expires: token.refresh_token_expires_at,
            client_id: client_id.to_string(),
            user_id: user_id.to_string(),
            scope: token.scope.clone(),
        })
    }
}

/// Token pair generated by the protocol engine, before it is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NewToken {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(default, alias = "accessTokenExpiresAt")]
    pub access_token_expires_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "refreshTokenExpiresAt")]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Persisted token pair, returned from `save_token` with its client and user attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub access_token_expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub client: Client,
    pub user: User,
}

impl Token {
    pub fn new(token: NewToken, client: Client, user: User) -> Self {
        Self {
            access_token: token.access_token,
            access_token_expires_at: token.access_token_expires_at,
            refresh_token: token.refresh_token,
            refresh_token_expires_at: token.refresh_token_expires_at,
            scope: token.scope,
            client,
            user,
        }
    }
}

/// Access token joined with its client and user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub access_token_expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub client: Client,
    pub user: User,
}

impl AccessToken {
    pub fn from_record(record: AccessTokenRecord, client: Client, user: User) -> Self {
        Self {
            access_token: record.access_token,
            access_token_expires_at: record.expires,
            scope: record.scope,
            client,
            user,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.access_token_expires_at
            .map(|expires| expires <= Utc::now())
            .unwrap_or(false)
    }
}

/// Refresh token joined with its client and user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshToken {
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
    #[serde(alias = "refreshTokenExpiresAt")]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub client: Client,
    pub user: User,
}

impl RefreshToken {
    pub fn from_record(record: RefreshTokenRecord, client: Client, user: User) -> Self {
        Self {
            refresh_token: record.refresh_token,
            refresh_token_expires_at: record.expires,
            scope: record.scope,
            client,
            user,
        }
    }

    /// Copy of this token with its expiry moved to [`revoked_at`].
    pub fn revoked(&self) -> Self {
        Self {
            refresh_token_expires_at: Some(revoked_at()),
            ..self.clone()
        }
    }
}
