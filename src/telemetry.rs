pub use oauth2_observability::init_telemetry;
