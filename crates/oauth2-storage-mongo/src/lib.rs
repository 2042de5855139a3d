use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    options::{ClientOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};

use oauth2_core::{
    AccessTokenRecord, AuthorizationCodeRecord, ClientRecord, OAuth2Error, RefreshTokenRecord,
    User,
};
use oauth2_ports::RecordStore;

/// Collection names used by [`MongoStore`].
///
/// Defaults match the pluralised names existing deployments already use. Ids and
/// references in those collections are `ObjectId`s and expiries are BSON dates,
/// which the core record types read and write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionNames {
    pub users: String,
    pub clients: String,
    pub access_tokens: String,
    pub refresh_tokens: String,
    pub authorization_codes: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            clients: "oauthclients".to_string(),
            access_tokens: "oauthaccesstokens".to_string(),
            refresh_tokens: "oauthrefreshtokens".to_string(),
            authorization_codes: "oauthauthorizationcodes".to_string(),
        }
    }
}

/// MongoDB-backed storage implementation.
///
/// Notes:
/// - Uses the core record types as documents via `serde`.
/// - Uses unique indexes on every field the model looks records up by.
pub struct MongoStore {
    db: Database,
    users: Collection<User>,
    clients: Collection<ClientRecord>,
    access_tokens: Collection<AccessTokenRecord>,
    refresh_tokens: Collection<RefreshTokenRecord>,
    authorization_codes: Collection<AuthorizationCodeRecord>,
}

impl MongoStore {
    pub async fn new(uri: &str) -> Result<Self, OAuth2Error> {
        Self::with_collections(uri, None, &CollectionNames::default()).await
    }

    /// Connect using an explicit database name (falls back to the URI's default
    /// database, then `oauth2`) and custom collection names.
    pub async fn with_collections(
        uri: &str,
        database: Option<&str>,
        names: &CollectionNames,
    ) -> Result<Self, OAuth2Error> {
        let mut opts = ClientOptions::parse(uri)
            .await
            .map_err(Self::mongo_err_to_oauth)?;
        if opts.app_name.is_none() {
            opts.app_name = Some("oauth2-storage-mongo".to_string());
        }

        let client = MongoClient::with_options(opts).map_err(Self::mongo_err_to_oauth)?;

        let db_name = database
            .map(|d| d.to_string())
            .or_else(|| client.default_database().map(|d| d.name().to_string()))
            .unwrap_or_else(|| "oauth2".to_string());

        let db = client.database(&db_name);

        Ok(Self {
            users: db.collection::<User>(&names.users),
            clients: db.collection::<ClientRecord>(&names.clients),
            access_tokens: db.collection::<AccessTokenRecord>(&names.access_tokens),
            refresh_tokens: db.collection::<RefreshTokenRecord>(&names.refresh_tokens),
            authorization_codes: db
                .collection::<AuthorizationCodeRecord>(&names.authorization_codes),
            db,
        })
    }

    /// Raw handle, for seeding and inspection.
    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn ensure_unique<T: Send + Sync>(
        collection: &Collection<T>,
        field: &str,
    ) -> Result<(), OAuth2Error> {
        let mut keys = Document::new();
        keys.insert(field, 1);

        collection
            .create_index(
                IndexModel::builder()
                    .keys(keys)
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn ensure_indexes(&self) -> Result<(), OAuth2Error> {
        Self::ensure_unique(&self.users, "username").await?;
        Self::ensure_unique(&self.clients, "client_id").await?;
        Self::ensure_unique(&self.access_tokens, "access_token").await?;
        Self::ensure_unique(&self.refresh_tokens, "refresh_token").await?;
        Self::ensure_unique(&self.authorization_codes, "authorization_code").await?;

        // Population looks references up by `_id`, which is always indexed.
        Ok(())
    }

    /// `_id` lookup. Hex ids match stored `ObjectId`s; other ids match as strings.
    fn id_filter(id: &str) -> Document {
        match ObjectId::parse_str(id) {
            Ok(oid) => doc! { "_id": oid },
            Err(_) => doc! { "_id": id },
        }
    }

    fn client_filter(client_id: &str, client_secret: Option<&str>) -> Document {
        let mut filter = doc! { "client_id": client_id };
        if let Some(secret) = client_secret {
            filter.insert("client_secret", secret);
        }
        filter
    }

    fn duplicate_key_error(err: &mongodb::error::Error) -> bool {
        // Canonical server-side message includes "E11000".
        err.to_string().contains("E11000")
    }

    fn mongo_err_to_oauth(err: mongodb::error::Error) -> OAuth2Error {
        if Self::duplicate_key_error(&err) {
            return OAuth2Error::invalid_request("duplicate key");
        }

        OAuth2Error::server_error(&err.to_string())
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn init(&self) -> Result<(), OAuth2Error> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(Self::mongo_err_to_oauth)?;
        self.ensure_indexes().await
    }

    async fn insert_user(&self, user: &User) -> Result<(), OAuth2Error> {
        self.users
            .insert_one(user, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, OAuth2Error> {
        self.users
            .find_one(Self::id_filter(id), None)
            .await
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, OAuth2Error> {
        self.users
            .find_one(doc! { "username": username }, None)
            .await
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<(), OAuth2Error> {
        self.clients
            .insert_one(client, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn find_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Option<ClientRecord>, OAuth2Error> {
        self.clients
            .find_one(Self::client_filter(client_id, client_secret), None)
            .await
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn find_client_by_id(&self, id: &str) -> Result<Option<ClientRecord>, OAuth2Error> {
        self.clients
            .find_one(Self::id_filter(id), None)
            .await
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn insert_access_token(&self, token: &AccessTokenRecord) -> Result<(), OAuth2Error> {
        self.access_tokens
            .insert_one(token, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn find_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AccessTokenRecord>, OAuth2Error> {
        self.access_tokens
            .find_one(doc! { "access_token": access_token }, None)
            .await
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn insert_refresh_token(&self, token: &RefreshTokenRecord) -> Result<(), OAuth2Error> {
        self.refresh_tokens
            .insert_one(token, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn find_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, OAuth2Error> {
        self.refresh_tokens
            .find_one(doc! { "refresh_token": refresh_token }, None)
            .await
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn delete_refresh_token(&self, refresh_token: &str) -> Result<bool, OAuth2Error> {
        self.refresh_tokens
            .delete_one(doc! { "refresh_token": refresh_token }, None)
            .await
            .map(|result| result.deleted_count > 0)
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn insert_authorization_code(
        &self,
        code: &AuthorizationCodeRecord,
    ) -> Result<(), OAuth2Error> {
        self.authorization_codes
            .insert_one(code, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn find_authorization_code(
        &self,
        code: &str,
    ) -> Result<Option<AuthorizationCodeRecord>, OAuth2Error> {
        self.authorization_codes
            .find_one(doc! { "authorization_code": code }, None)
            .await
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn expire_authorization_code(
        &self,
        code: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, OAuth2Error> {
        // Same BSON date encoding the record's `expires` field uses.
        let expires = bson::DateTime::from_chrono(expires);

        self.authorization_codes
            .update_one(
                doc! { "authorization_code": code },
                doc! { "$set": { "expires": expires } },
                None,
            )
            .await
            .map(|result| result.matched_count > 0)
            .map_err(Self::mongo_err_to_oauth)
    }

    async fn healthcheck(&self) -> Result<(), OAuth2Error> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_oauth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2_core::NewToken;

    #[test]
    fn client_filter_includes_secret_only_when_given() {
        let filter = MongoStore::client_filter("c1", None);
        assert!(!filter.contains_key("client_secret"));

        let filter = MongoStore::client_filter("c1", Some("s3cret"));
        assert_eq!(filter.get_str("client_secret").unwrap(), "s3cret");
    }

    #[test]
    fn id_filter_matches_object_ids_and_plain_strings() {
        let oid = ObjectId::new();
        let filter = MongoStore::id_filter(&oid.to_hex());
        assert_eq!(filter.get_object_id("_id").unwrap(), oid);

        let filter = MongoStore::id_filter("legacy-id");
        assert_eq!(filter.get_str("_id").unwrap(), "legacy-id");
    }

    #[test]
    fn token_record_serializes_references_as_object_ids() {
        let client_id = ObjectId::new();
        let user_id = ObjectId::new();
        let token = NewToken {
            access_token: "abc".to_string(),
            access_token_expires_at: Some(Utc::now()),
            scope: Some("read".to_string()),
            ..Default::default()
        };
        let record = AccessTokenRecord::new(&token, &client_id.to_hex(), &user_id.to_hex());

        let doc = bson::to_document(&record).expect("record should serialize to bson document");
        assert_eq!(doc.get_object_id("_id").unwrap().to_hex(), record.id);
        assert_eq!(doc.get_object_id("OAuthClient").unwrap(), client_id);
        assert_eq!(doc.get_object_id("User").unwrap(), user_id);
        assert!(doc.get_datetime("expires").is_ok());
    }

    #[test]
    fn reads_documents_written_by_existing_deployments() {
        let client_oid = ObjectId::new();
        let user_oid = ObjectId::new();
        let expires = bson::DateTime::from_millis(1_900_000_000_000);

        let token: AccessTokenRecord = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "access_token": "abc",
            "expires": expires,
            "OAuthClient": client_oid,
            "User": user_oid,
            "scope": "read",
            "__v": 0,
        })
        .expect("legacy access token should deserialize");
        assert_eq!(token.client_id, client_oid.to_hex());
        assert_eq!(token.user_id, user_oid.to_hex());
        assert_eq!(token.expires, Some(expires.to_chrono()));

        let refresh: RefreshTokenRecord = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "refresh_token": "xyz",
            "expires": expires,
            "OAuthClient": client_oid,
            "User": user_oid,
        })
        .expect("legacy refresh token should deserialize");
        assert_eq!(refresh.user_id, user_oid.to_hex());

        let code: AuthorizationCodeRecord = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "authorization_code": "code-1",
            "expires": expires,
            "redirect_uri": "http://localhost/cb",
            "OAuthClient": client_oid,
            "User": user_oid,
        })
        .expect("legacy authorization code should deserialize");
        assert_eq!(code.client_id, client_oid.to_hex());

        let client: ClientRecord = bson::from_document(doc! {
            "_id": client_oid,
            "client_id": "C1",
            "client_secret": "c1-secret",
            "redirect_uri": "http://localhost/cb",
            "grants": ["password"],
            "User": user_oid,
        })
        .expect("legacy client should deserialize");
        assert_eq!(client.id, client_oid.to_hex());
        assert_eq!(client.user_id, Some(user_oid.to_hex()));

        let user: User = bson::from_document(doc! {
            "_id": user_oid,
            "username": "U1",
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
        })
        .expect("legacy user should deserialize");
        assert_eq!(user.id, user_oid.to_hex());

        let plaintext: User = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "username": "U2",
            "password": "wonderland",
        })
        .expect("user with a plaintext password should still deserialize");
        assert!(!plaintext.verify_password("wonderland"));
    }

    #[test]
    fn client_record_omits_secret_when_none() {
        let record = ClientRecord::new("c1".to_string(), None, "http://localhost/cb".to_string());

        let doc = bson::to_document(&record).expect("client should serialize to bson document");
        assert!(
            !doc.contains_key("client_secret"),
            "client_secret should be omitted so secret-less lookups stay exact"
        );
    }

    #[test]
    fn default_collection_names() {
        let names = CollectionNames::default();
        assert_eq!(names.clients, "oauthclients");
        assert_eq!(names.authorization_codes, "oauthauthorizationcodes");
    }
}
