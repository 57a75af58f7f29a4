//! Content-addressed image store with size-capped eviction
//!
//! Stores inline `data:image/...;base64,` payloads as files on disk, keyed by
//! a hash of the encoded payload so repeated images are written once. A JSON
//! index next to the files survives restarts, and the oldest images are
//! evicted once the store grows past its configured size.

pub mod codec;
pub mod error;
pub mod format;
pub mod index;
mod store;
pub mod types;

pub use codec::{content_hash, decode, DecodedImage, ImageFormat};
pub use error::{ImageStoreError, Result};
pub use format::format_size;
pub use index::MetadataIndex;
pub use store::ImageStore;
pub use types::{Dimensions, EvictionReport, ImageRecord, StorageStats, StoreConfig};
