use oauth2_mongo_model::{
    config::Config,
    storage::{create_store, RecordStore},
    telemetry::init_telemetry,
};

// Connects to the configured store, verifies it is reachable and creates the
// unique indexes the model relies on. Run once per deployment (or on every
// rollout; index creation is idempotent).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_telemetry("oauth2-model-init")?;

    let config = Config::default();
    tracing::info!(config = ?config.sanitized(), "loaded configuration");

    let store = create_store(&config).await?;
    store.init().await?;
    store.healthcheck().await?;

    tracing::info!("store initialized");
    Ok(())
}
