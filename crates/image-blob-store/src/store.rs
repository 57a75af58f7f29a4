//! Content-addressed image storage with in-memory metadata

use crate::codec::{self, content_hash};
use crate::error::Result;
use crate::format::format_size;
use crate::index::MetadataIndex;
use crate::types::{EvictionReport, ImageRecord, StorageStats, StoreConfig};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// An image store backed by a directory of files and a JSON index
///
/// Saves, evictions and purges are serialized behind one lock, so two
/// concurrent saves of the same payload still produce a single record.
pub struct ImageStore {
    config: StoreConfig,
    state: Mutex<StoreState>,
}

struct StoreState {
    index: MetadataIndex,
    /// Last millisecond timestamp handed out for a filename
    last_timestamp_ms: i64,
}

impl StoreState {
    /// Pick a `{millis}_{hash}.{ext}` name not used by any record or file
    async fn unique_filename(
        &mut self,
        dir: &Path,
        hash: &str,
        ext: &str,
    ) -> (String, DateTime<Utc>) {
        let mut millis = Utc::now()
            .timestamp_millis()
            .max(self.last_timestamp_ms + 1);

        loop {
            let filename = format!("{}_{}.{}", millis, hash, ext);
            let candidate = dir.join(&filename);
            let on_disk = match fs::try_exists(&candidate).await {
                Ok(exists) => exists,
                Err(e) => {
                    warn!(path = ?candidate, error = %e, "Failed to check for existing image file");
                    false
                }
            };
            if !on_disk && !self.index.contains_filename(&filename) {
                self.last_timestamp_ms = millis;
                let created_at = DateTime::from_timestamp_millis(millis).unwrap_or_default();
                return (filename, created_at);
            }
            millis += 1;
        }
    }

    async fn persist(&self) {
        if let Err(e) = self.index.persist().await {
            warn!(path = ?self.index.path(), error = %e, "Failed to persist metadata index");
        }
    }
}

impl ImageStore {
    /// Create a new image store; call [`ImageStore::initialize`] before use
    pub fn new(config: StoreConfig) -> Self {
        let index = MetadataIndex::new(config.index_path());
        Self {
            config,
            state: Mutex::new(StoreState {
                index,
                last_timestamp_ms: 0,
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Ensure the storage directory exists and load the metadata index
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.config.storage_dir).await?;
        let mut index = MetadataIndex::load(self.config.index_path()).await;
        index.relocate(&self.config.storage_dir);

        let mut state = self.state.lock().await;
        let newest = index
            .all()
            .iter()
            .map(|r| r.created_at.timestamp_millis())
            .max()
            .unwrap_or(0);
        state.last_timestamp_ms = state.last_timestamp_ms.max(newest);
        state.index = index;

        info!(
            storage_dir = ?self.config.storage_dir,
            records = state.index.len(),
            "Image store initialized"
        );
        Ok(())
    }

    /// Store an image from a data URI
    ///
    /// Returns `Ok(None)` when the input is not a supported image data URI.
    /// If an image with the same content hash is already stored, its record
    /// is returned and nothing is written.
    pub async fn save(&self, data_uri: &str) -> Result<Option<ImageRecord>> {
        let image = match codec::decode(data_uri) {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "Skipping invalid image data");
                return Ok(None);
            }
        };
        let hash = content_hash(image.payload);

        let mut state = self.state.lock().await;

        if let Some(existing) = state.index.find_by_hash(&hash) {
            debug!(
                hash = %hash,
                path = ?existing.path,
                size = %format_size(existing.size),
                "Image already stored"
            );
            return Ok(Some(existing.clone()));
        }

        let dimensions = image.format.dimensions(&image.bytes);
        let (filename, created_at) = state
            .unique_filename(&self.config.storage_dir, &hash, image.format.extension())
            .await;
        let path = self.config.storage_dir.join(&filename);

        fs::write(&path, &image.bytes).await?;

        let record = ImageRecord {
            filename,
            path,
            size: image.size(),
            mime_type: image.format.mime_type(),
            width: dimensions.map(|d| d.width),
            height: dimensions.map(|d| d.height),
            created_at,
            hash,
        };

        state.index.insert(record.clone());
        state.persist().await;

        let dims = dimensions
            .map(|d| format!("{}x{}", d.width, d.height))
            .unwrap_or_else(|| "unknown".to_string());
        info!(
            path = ?record.path,
            size = %format_size(record.size),
            dimensions = %dims,
            "Saved image"
        );

        self.evict_locked(&mut state).await;

        Ok(Some(record))
    }

    /// Store an image and return only its path
    pub async fn save_path(&self, data_uri: &str) -> Result<Option<PathBuf>> {
        Ok(self.save(data_uri).await?.map(|record| record.path))
    }

    /// Get current storage statistics
    pub async fn stats(&self) -> StorageStats {
        let state = self.state.lock().await;
        let records = state.index.all();

        StorageStats {
            total_size: state.index.total_size(),
            total_files: records.len(),
            oldest_file: records.iter().min_by_key(|r| r.created_at).map(|r| r.created_at),
            newest_file: records.iter().max_by_key(|r| r.created_at).map(|r| r.created_at),
        }
    }

    /// Evict the oldest images if the store is over its size cap
    pub async fn evict_if_over_capacity(&self) -> EvictionReport {
        let mut state = self.state.lock().await;
        self.evict_locked(&mut state).await
    }

    async fn evict_locked(&self, state: &mut StoreState) -> EvictionReport {
        let mut report = EvictionReport::default();

        let total = state.index.total_size();
        let max_bytes = self.config.max_bytes();
        if total <= max_bytes {
            return report;
        }

        // Clear down to `min_free_space_mb` below the cap, not just to it
        let bytes_to_free = (total - max_bytes).saturating_add(self.config.min_free_bytes());

        let mut candidates = state.index.all().to_vec();
        candidates.sort_by_key(|r| r.created_at);

        for record in candidates {
            if report.freed_bytes >= bytes_to_free {
                break;
            }
            if self.remove_image_file(&record).await {
                state.index.remove(&record.filename);
                report.removed += 1;
                report.freed_bytes += record.size;
                info!(
                    path = ?record.path,
                    size = %format_size(record.size),
                    "Evicted old image"
                );
            }
        }

        state.persist().await;
        info!(
            removed = report.removed,
            freed = %format_size(report.freed_bytes),
            "Eviction complete"
        );
        report
    }

    /// Delete every stored image, returning how many were removed
    pub async fn purge_all(&self) -> usize {
        let mut state = self.state.lock().await;
        let records = state.index.all().to_vec();
        let mut removed = 0;

        for record in records {
            if self.remove_image_file(&record).await {
                state.index.remove(&record.filename);
                removed += 1;
            }
        }

        state.persist().await;
        info!(removed, remaining = state.index.len(), "Purged image store");
        removed
    }

    /// Delete the file behind a record inside the storage directory
    async fn remove_image_file(&self, record: &ImageRecord) -> bool {
        let path = self.config.storage_dir.join(&record.filename);
        match fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to delete image file");
                false
            }
        }
    }
}
