//! Store configuration from environment variables

use image_blob_store::StoreConfig;
use std::env;
use std::path::PathBuf;

/// Build the store configuration from environment variables
pub fn from_env() -> StoreConfig {
    from_lookup(|key| env::var(key).ok())
}

/// Build the store configuration from any variable source, falling back to
/// defaults for missing or unparseable values
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreConfig {
    let defaults = StoreConfig::default();

    let storage_dir = lookup("IMAGE_STORE_DIR")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or(defaults.storage_dir);

    let max_storage_mb = lookup("IMAGE_STORE_MAX_MB")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(defaults.max_storage_mb);

    let min_free_space_mb = lookup("IMAGE_STORE_MIN_FREE_MB")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(defaults.min_free_space_mb);

    StoreConfig {
        max_storage_mb,
        min_free_space_mb,
        storage_dir,
    }
}
