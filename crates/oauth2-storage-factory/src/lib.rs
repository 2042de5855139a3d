//! Storage backend selection for the OAuth2 model adapter.
//!
//! This crate centralizes URL-based backend selection (MongoDB vs in-memory),
//! wraps the chosen implementation with `ObservedStore` for tracing, and
//! assembles the `OAuthModel` on top of it.

use std::sync::Arc;

use oauth2_config::Config;
use oauth2_core::OAuth2Error;

pub use oauth2_model::StoreModel;
pub use oauth2_observability::ObservedStore;
pub use oauth2_ports::{DynModel, DynRecordStore, OAuthModel, RecordStore};

pub mod memory {
    pub use oauth2_storage_memory::MemoryStore;
}

#[cfg(feature = "mongo")]
pub mod mongo {
    pub use oauth2_storage_mongo::{CollectionNames, MongoStore};

    pub(crate) fn collection_names(config: &oauth2_config::CollectionsConfig) -> CollectionNames {
        CollectionNames {
            users: config.users.clone(),
            clients: config.clients.clone(),
            access_tokens: config.access_tokens.clone(),
            refresh_tokens: config.refresh_tokens.clone(),
            authorization_codes: config.authorization_codes.clone(),
        }
    }
}

fn is_memory_url(url: &str) -> bool {
    url == "memory:" || url.starts_with("memory://")
}

fn is_mongo_url(url: &str) -> bool {
    url.starts_with("mongodb://") || url.starts_with("mongodb+srv://")
}

/// Create a record store based on the configured URL scheme.
///
/// Supported:
/// - `memory:` / `memory://` -> in-process store
/// - `mongodb://...` and `mongodb+srv://...` -> Mongo backend (requires `--features mongo`)
pub async fn create_store(config: &Config) -> Result<DynRecordStore, OAuth2Error> {
    let url = config.database.url.as_str();

    if is_memory_url(url) {
        let inner: DynRecordStore = Arc::new(memory::MemoryStore::new());
        return Ok(Arc::new(ObservedStore::new(inner, "memory".to_string())));
    }

    if is_mongo_url(url) {
        #[cfg(feature = "mongo")]
        {
            let names = mongo::collection_names(&config.collections);
            let storage =
                mongo::MongoStore::with_collections(url, config.database.name.as_deref(), &names)
                    .await?;
            let inner: DynRecordStore = Arc::new(storage);
            let observed = ObservedStore::new(inner, "mongodb".to_string());
            return Ok(Arc::new(observed));
        }

        #[cfg(not(feature = "mongo"))]
        {
            return Err(OAuth2Error::server_error(
                "MongoDB backend requested but the binary was built without the `mongo` feature",
            ));
        }
    }

    let sanitized = config.sanitized();
    Err(OAuth2Error::invalid_request(&format!(
        "unsupported database url: {}",
        sanitized.database.url
    )))
}

/// Create the store, initialize it, and build the model adapter on top.
pub async fn create_model(config: &Config) -> Result<DynModel, OAuth2Error> {
    let store = create_store(config).await?;
    store.init().await?;

    tracing::info!(database_url = %config.sanitized().database.url, "oauth2 model store ready");

    Ok(Arc::new(StoreModel::new(store)))
}
