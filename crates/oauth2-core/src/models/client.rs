use serde::{Deserialize, Serialize};

use crate::{document, new_record_id};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    Password,
    RefreshToken,
    ClientCredentials,
}

impl GrantType {
    /// Grants every client is allowed to use, regardless of what is stored.
    pub const ALL: [GrantType; 4] = [
        GrantType::AuthorizationCode,
        GrantType::Password,
        GrantType::RefreshToken,
        GrantType::ClientCredentials,
    ];
}

/// Client document as persisted in the `oauthclients` collection.
///
/// Any `grants` field present in storage is ignored on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientRecord {
    #[serde(rename = "_id", with = "document::object_id")]
    pub id: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Owning user, used by the client-credentials grant.
    #[serde(
        rename = "User",
        default,
        skip_serializing_if = "Option::is_none",
        with = "document::object_id_optional"
    )]
    pub user_id: Option<String>,
}

impl ClientRecord {
    pub fn new(client_id: String, client_secret: Option<String>, redirect_uri: String) -> Self {
        Self {
            id: new_record_id(),
            client_id,
            client_secret,
            redirect_uri,
            scope: None,
            user_id: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Client as handed to the protocol engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub id: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub redirect_uris: Vec<String>,
    pub grants: Vec<GrantType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl From<ClientRecord> for Client {
    fn from(record: ClientRecord) -> Self {
        Self {
            id: record.id,
            client_id: record.client_id,
            client_secret: record.client_secret,
            redirect_uris: vec![record.redirect_uri],
            grants: GrantType::ALL.to_vec(),
            scope: record.scope,
            user_id: record.user_id,
        }
    }
}
