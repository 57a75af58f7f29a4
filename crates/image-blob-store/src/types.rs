//! Store types

use crate::error::{ImageStoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(crate) const BYTES_PER_MB: u64 = 1024 * 1024;

/// Name of the metadata index file inside the storage directory
pub const INDEX_FILE_NAME: &str = "metadata.json";

/// Pixel dimensions of a stored image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Metadata for one stored image file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// `{millis}_{hash}.{ext}`, also the key in the index file
    pub filename: String,
    pub path: PathBuf,
    /// Decoded payload length in bytes
    pub size: u64,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub hash: String,
}

impl ImageRecord {
    pub fn dimensions(&self) -> Option<Dimensions> {
        Some(Dimensions {
            width: self.width?,
            height: self.height?,
        })
    }
}

/// Aggregate statistics over all live records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_size: u64,
    pub total_files: usize,
    pub oldest_file: Option<DateTime<Utc>>,
    pub newest_file: Option<DateTime<Utc>>,
}

/// Outcome of one eviction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub removed: usize,
    pub freed_bytes: u64,
}

/// Configuration for the image store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Size above which an eviction pass runs
    pub max_storage_mb: u64,
    /// Headroom an eviction pass clears below `max_storage_mb`
    pub min_free_space_mb: u64,
    pub storage_dir: PathBuf,
}

impl StoreConfig {
    pub fn max_bytes(&self) -> u64 {
        self.max_storage_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn min_free_bytes(&self) -> u64 {
        self.min_free_space_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn index_path(&self) -> PathBuf {
        self.storage_dir.join(INDEX_FILE_NAME)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_storage_mb == 0 {
            return Err(ImageStoreError::Config(
                "max_storage_mb must be greater than 0".to_string(),
            ));
        }
        if self.storage_dir.as_os_str().is_empty() {
            return Err(ImageStoreError::Config(
                "storage_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-user application data location used when no directory is configured
    pub fn default_storage_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("image-store")
            .join("images")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_storage_mb: 2048,
            min_free_space_mb: 512,
            storage_dir: Self::default_storage_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ImageRecord {
        ImageRecord {
            filename: "1700000000000_0123456789abcdef.png".to_string(),
            path: PathBuf::from("/images/1700000000000_0123456789abcdef.png"),
            size: 12345,
            mime_type: "image/png".to_string(),
            width: Some(640),
            height: Some(480),
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            hash: "0123456789abcdef".to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.max_storage_mb, 2048);
        assert_eq!(config.min_free_space_mb, 512);
        assert!(config.storage_dir.ends_with("image-store/images"));
        assert_eq!(config.max_bytes(), 2048 * 1024 * 1024);
        assert_eq!(config.min_free_bytes(), 512 * 1024 * 1024);
        assert!(config.index_path().ends_with("metadata.json"));
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let config = StoreConfig {
            max_storage_mb: 0,
            ..StoreConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ImageStoreError::Config(_))
        ));
        assert!(StoreConfig::default().validate().is_ok());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["mimeType"], "image/png");
        assert_eq!(json["width"], 640);
        assert!(json["createdAt"]
            .as_str()
            .unwrap()
            .starts_with("2023-11-14T22:13:20"));
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_record_omits_missing_dimensions() {
        let record = ImageRecord {
            width: None,
            height: None,
            ..sample_record()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("width"));
        assert!(!json.contains("height"));

        let back: ImageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.dimensions(), None);
    }

    #[test]
    fn test_stats_default_is_empty() {
        let stats = StorageStats::default();
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.total_files, 0);
        assert!(stats.oldest_file.is_none());
        assert!(stats.newest_file.is_none());
    }
}
