//! Command-line arguments

use clap::{Parser, Subcommand};
use image_blob_store::StoreConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "image-store", version, about = "Store inline images as deduplicated local files")]
pub struct Cli {
    /// Storage directory (overrides IMAGE_STORE_DIR)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Size cap in MB before old images are evicted (overrides IMAGE_STORE_MAX_MB)
    #[arg(long, global = true)]
    pub max_mb: Option<u64>,

    /// Extra MB to clear below the cap when evicting (overrides IMAGE_STORE_MIN_FREE_MB)
    #[arg(long, global = true)]
    pub min_free_mb: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Store an image given as a data URI, or a file containing one
    Save { input: String },
    /// Show storage statistics
    #[command(alias = "show-storage")]
    Stats,
    /// Delete every stored image
    #[command(alias = "cleanup-images")]
    Cleanup,
    /// Evict the oldest images if over the size cap
    Evict,
}

impl Cli {
    /// Apply command-line overrides on top of `base`
    pub fn store_config(&self, base: StoreConfig) -> StoreConfig {
        StoreConfig {
            max_storage_mb: self.max_mb.unwrap_or(base.max_storage_mb),
            min_free_space_mb: self.min_free_mb.unwrap_or(base.min_free_space_mb),
            storage_dir: self.dir.clone().unwrap_or(base.storage_dir),
        }
    }
}
