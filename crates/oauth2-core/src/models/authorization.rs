use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{document, new_record_id, revoked_at, Client, User};

/// Authorization code document (`oauthauthorizationcodes`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizationCodeRecord {
    #[serde(rename = "_id", with = "document::object_id")]
    pub id: String,
    pub authorization_code: String,
    #[serde(default, with = "document::datetime_optional")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(rename = "OAuthClient", with = "document::object_id")]
    pub client_id: String,
    #[serde(rename = "User", with = "document::object_id")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl AuthorizationCodeRecord {
    pub fn new(code: &NewAuthorizationCode, client_id: &str, user_id: &str) -> Self {
        Self {
            id: new_record_id(),
            authorization_code: code.authorization_code.clone(),
            expires: code.expires_at,
            redirect_uri: code.redirect_uri.clone(),
            client_id: client_id.to_string(),
            user_id: user_id.to_string(),
            scope: code.scope.clone(),
        }
    }
}

/// Authorization code generated by the protocol engine, before it is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NewAuthorizationCode {
    #[serde(alias = "authorizationCode")]
    pub authorization_code: String,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "redirectUri")]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Authorization code joined with its client and user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizationCode {
    pub code: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub client: Client,
    pub user: User,
}

impl AuthorizationCode {
    pub fn new(code: NewAuthorizationCode, client: Client, user: User) -> Self {
        Self {
            code: code.authorization_code,
            expires_at: code.expires_at,
            redirect_uri: code.redirect_uri,
            scope: code.scope,
            client,
            user,
        }
    }

    /// Reshape a stored code. Codes saved without a redirect URI fall back to the
    /// client's registered one.
    pub fn from_record(record: AuthorizationCodeRecord, client: Client, user: User) -> Self {
        let redirect_uri = record
            .redirect_uri
            .or_else(|| client.redirect_uris.first().cloned());

        Self {
            code: record.authorization_code,
            expires_at: record.expires,
            redirect_uri,
            scope: record.scope,
            client,
            user,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires| expires <= Utc::now())
            .unwrap_or(false)
    }

    pub fn revoked(&self) -> Self {
        Self {
            expires_at: Some(revoked_at()),
            ..self.clone()
        }
    }
}
