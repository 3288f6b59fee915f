//! Storage module for persisting deals
//!
//! This module handles the deal catalog, including:
//! - The `DealStore` interface and its JSON file and SQLite backends
//! - Provenance-aware merging of extracted batches
//! - Filtered, sorted queries over stored deals

mod json;
mod merge;
mod schema;
mod sqlite;
mod traits;

pub use json::JsonStore;
pub use merge::{merge, merge_into_store, MergeStats};
pub use sqlite::SqliteStore;
pub use traits::{DealQuery, DealStore, SortDirection, SortKey, StorageError, StorageResult};

use crate::config::{OutputConfig, StoreBackend};
use std::path::Path;

/// Opens the store configured in `[output]`
///
/// # Arguments
///
/// * `config` - The output configuration
///
/// # Returns
///
/// * `Ok(Box<dyn DealStore>)` - The opened store
/// * `Err(StorageError)` - Failed to open the store
pub fn open_store(config: &OutputConfig) -> StorageResult<Box<dyn DealStore>> {
    let path = Path::new(&config.store_path);
    let store: Box<dyn DealStore> = match config.resolved_backend() {
        StoreBackend::Json => Box::new(JsonStore::open(path)?),
        StoreBackend::Sqlite => Box::new(SqliteStore::open(path)?),
    };

    tracing::debug!(
        "Opened {:?} store at {}",
        config.resolved_backend(),
        path.display()
    );
    Ok(store)
}
