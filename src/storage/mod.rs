pub use oauth2_storage_factory::{
    create_model, create_store, DynRecordStore, ObservedStore, RecordStore,
};

/// In-process backend.
pub use oauth2_storage_factory::memory;

/// MongoDB backend.
#[cfg(feature = "mongo")]
pub use oauth2_storage_factory::mongo;
