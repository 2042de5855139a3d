use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging for a process embedding the model adapter.
///
/// - Emits JSON lines via `tracing_subscriber`, including the active span stack
///   so every event carries the `db` span fields of the store call it belongs to.
/// - Honours `RUST_LOG`; defaults to `info`.
/// - Bridges `log` records into `tracing` (e.g., from the MongoDB driver's
///   dependencies).
pub fn init_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()?;

    // Ignore errors if a logger was already set (e.g., tests).
    let _ = tracing_log::LogTracer::init();

    tracing::info!(service.name = service_name, "telemetry initialized");
    Ok(())
}
