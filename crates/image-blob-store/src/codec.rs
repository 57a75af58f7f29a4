//! Data URI decoding, content hashing and dimension sniffing

use crate::error::{ImageStoreError, Result};
use crate::types::Dimensions;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static DATA_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg|gif|webp);base64,(.+)$").unwrap()
});

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// Length of the truncated hex digest used as the dedup key
pub const HASH_LEN: usize = 16;

/// Image type tokens accepted in a data URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Jpg,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "png" => Some(Self::Png),
            "jpeg" => Some(Self::Jpeg),
            "jpg" => Some(Self::Jpg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// The token as written in the URI, also used as the file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Jpg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> String {
        format!("image/{}", self.extension())
    }

    /// Read pixel dimensions from the raw bytes, for formats with a known header layout
    pub fn dimensions(&self, bytes: &[u8]) -> Option<Dimensions> {
        match self {
            Self::Png => png_dimensions(bytes),
            Self::Jpeg | Self::Jpg | Self::Gif | Self::Webp => None,
        }
    }
}

/// A data URI split into its parts and decoded
#[derive(Debug, Clone)]
pub struct DecodedImage<'a> {
    pub format: ImageFormat,
    /// The base64 text exactly as it appeared in the URI
    pub payload: &'a str,
    pub bytes: Vec<u8>,
}

impl DecodedImage<'_> {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Decode a `data:image/<type>;base64,<payload>` URI
pub fn decode(data_uri: &str) -> Result<DecodedImage<'_>> {
    let caps = DATA_URI_RE.captures(data_uri).ok_or_else(|| {
        ImageStoreError::InvalidFormat("expected data:image/<type>;base64,<payload>".to_string())
    })?;

    let token = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let format = ImageFormat::from_token(token)
        .ok_or_else(|| ImageStoreError::InvalidFormat(format!("unknown image type: {}", token)))?;

    let payload = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ImageStoreError::InvalidFormat(format!("bad base64 payload: {}", e)))?;

    Ok(DecodedImage {
        format,
        payload,
        bytes,
    })
}

/// Hash of the encoded payload text, truncated to [`HASH_LEN`] hex chars
pub fn content_hash(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(HASH_LEN);
    digest
}

fn png_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    if bytes.get(..8)? != &PNG_SIGNATURE[..] {
        return None;
    }
    // IHDR data starts right after the signature, chunk length and chunk type
    let width = u32::from_be_bytes(bytes.get(16..20)?.try_into().ok()?);
    let height = u32::from_be_bytes(bytes.get(20..24)?.try_into().ok()?);
    Some(Dimensions { width, height })
}
