//! Command handlers that drive the image store and render its results

use crate::cli::Command;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use image_blob_store::{format_size, ImageRecord, ImageStore, StorageStats, StoreConfig};
use std::path::Path;
use tracing::info;

/// Run one command against an initialized store, returning the text to print
pub async fn run(store: &ImageStore, command: Command) -> Result<String> {
    match command {
        Command::Save { input } => save(store, &input).await,
        Command::Stats => Ok(storage_report(&store.stats().await, store.config())),
        Command::Cleanup => {
            let deleted = store.purge_all().await;
            info!(deleted, "Cleanup finished");
            Ok(format!("Deleted {} images", deleted))
        }
        Command::Evict => {
            let report = store.evict_if_over_capacity().await;
            Ok(format!(
                "Evicted {} images, freed {}",
                report.removed,
                format_size(report.freed_bytes)
            ))
        }
    }
}

async fn save(store: &ImageStore, input: &str) -> Result<String> {
    let data_uri = read_input(input).await?;
    match store.save(&data_uri).await? {
        Some(record) => Ok(describe(&record)),
        None => Ok("Skipped: input is not a supported image data URI".to_string()),
    }
}

/// A data URI given directly, or read from the named file
async fn read_input(input: &str) -> Result<String> {
    if input.starts_with("data:") {
        return Ok(input.to_string());
    }
    let contents = tokio::fs::read_to_string(Path::new(input)).await?;
    Ok(contents.trim().to_string())
}

fn describe(record: &ImageRecord) -> String {
    let dims = match record.dimensions() {
        Some(d) => format!(", {}x{}", d.width, d.height),
        None => String::new(),
    };
    format!(
        "{} ({}{})",
        record.path.display(),
        format_size(record.size),
        dims
    )
}

/// Render storage statistics for display
pub fn storage_report(stats: &StorageStats, config: &StoreConfig) -> String {
    let date_or_na = |date: Option<DateTime<Utc>>| match date {
        Some(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => "N/A".to_string(),
    };

    [
        "=== Image Storage Stats ===".to_string(),
        format!("Total Files: {}", stats.total_files),
        format!("Total Size: {}", format_size(stats.total_size)),
        format!("Oldest File: {}", date_or_na(stats.oldest_file)),
        format!("Newest File: {}", date_or_na(stats.newest_file)),
        format!("Storage Dir: {}", config.storage_dir.display()),
        format!("Max Storage: {} MB", config.max_storage_mb),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::path::PathBuf;
    use tempfile::tempdir;

    async fn open(dir: &Path) -> ImageStore {
        let store = ImageStore::new(StoreConfig {
            max_storage_mb: 1,
            min_free_space_mb: 0,
            storage_dir: dir.to_path_buf(),
        });
        store.initialize().await.unwrap();
        store
    }

    fn gif_uri(seed: u8, len: usize) -> String {
        format!("data:image/gif;base64,{}", STANDARD.encode(vec![seed; len]))
    }

    fn save_cmd(input: impl Into<String>) -> Command {
        Command::Save {
            input: input.into(),
        }
    }

    #[tokio::test]
    async fn test_save_prints_path() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;

        let output = run(&store, save_cmd(gif_uri(1, 2048))).await.unwrap();
        assert!(output.starts_with(&dir.path().display().to_string()));
        assert!(output.ends_with(".gif (2.00 KB)"));
    }

    #[tokio::test]
    async fn test_save_reads_uri_from_file() {
        let dir = tempdir().unwrap();
        let store = open(&dir.path().join("images")).await;
        let input = dir.path().join("pasted.txt");
        std::fs::write(&input, format!("{}\n", gif_uri(2, 10))).unwrap();

        let output = run(&store, save_cmd(input.display().to_string()))
            .await
            .unwrap();
        assert!(output.contains(".gif"));
        assert_eq!(store.stats().await.total_files, 1);
    }

    #[tokio::test]
    async fn test_save_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;

        let missing = dir.path().join("nope.txt").display().to_string();
        assert!(run(&store, save_cmd(missing)).await.is_err());
    }

    #[tokio::test]
    async fn test_save_invalid_uri_is_skipped() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;

        let output = run(&store, save_cmd("data:text/plain;base64,abcd"))
            .await
            .unwrap();
        assert!(output.starts_with("Skipped"));
        assert_eq!(store.stats().await.total_files, 0);
    }

    #[tokio::test]
    async fn test_cleanup_reports_count() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;
        for seed in 0..3 {
            store.save(&gif_uri(seed, 16)).await.unwrap();
        }

        let output = run(&store, Command::Cleanup).await.unwrap();
        assert_eq!(output, "Deleted 3 images");
        assert_eq!(store.stats().await.total_files, 0);
    }

    #[tokio::test]
    async fn test_evict_under_cap() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;
        store.save(&gif_uri(1, 16)).await.unwrap();

        let output = run(&store, Command::Evict).await.unwrap();
        assert_eq!(output, "Evicted 0 images, freed 0.00 B");
    }

    #[tokio::test]
    async fn test_stats_command() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;
        store.save(&gif_uri(1, 1536)).await.unwrap();

        let output = run(&store, Command::Stats).await.unwrap();
        assert!(output.contains("Total Files: 1"));
        assert!(output.contains("Total Size: 1.50 KB"));
        assert!(!output.contains("N/A"));
        assert!(output.contains("Max Storage: 1 MB"));
    }

    #[test]
    fn test_storage_report_empty() {
        let config = StoreConfig {
            max_storage_mb: 2048,
            min_free_space_mb: 512,
            storage_dir: PathBuf::from("/data/images"),
        };
        let report = storage_report(&StorageStats::default(), &config);

        assert_eq!(
            report,
            "=== Image Storage Stats ===\n\
             Total Files: 0\n\
             Total Size: 0.00 B\n\
             Oldest File: N/A\n\
             Newest File: N/A\n\
             Storage Dir: /data/images\n\
             Max Storage: 2048 MB"
        );
    }

    #[test]
    fn test_storage_report_dates() {
        let config = StoreConfig {
            max_storage_mb: 1,
            min_free_space_mb: 0,
            storage_dir: PathBuf::from("/data/images"),
        };
        let stats = StorageStats {
            total_size: 10,
            total_files: 2,
            oldest_file: DateTime::from_timestamp_millis(1_700_000_000_000),
            newest_file: DateTime::from_timestamp_millis(1_700_000_000_123),
        };
        let report = storage_report(&stats, &config);

        assert!(report.contains("Oldest File: 2023-11-14T22:13:20.000Z"));
        assert!(report.contains("Newest File: 2023-11-14T22:13:20.123Z"));
    }
}
