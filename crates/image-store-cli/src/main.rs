//! image-store - keep inline images as deduplicated local files
//!
//! Decodes `data:image/...;base64,` payloads into a local directory, reports
//! storage usage, and evicts or purges stored images.

mod cli;
mod commands;
mod config;
mod error;

use crate::cli::Cli;
use crate::error::Result;
use clap::Parser;
use image_blob_store::{format_size, ImageStore};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("image_store=info".parse()?)
        .add_directive("image_blob_store=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    };

    let config = cli.store_config(config::from_env());
    config.validate()?;
    info!("Storage dir: {:?}", config.storage_dir);
    info!(
        "Max storage: {} (evicts down to {} below)",
        format_size(config.max_bytes()),
        format_size(config.min_free_bytes())
    );

    let store = ImageStore::new(config);
    store.initialize().await?;

    let output = commands::run(&store, cli.command).await?;
    println!("{}", output);

    Ok(())
}
