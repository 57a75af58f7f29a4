//! Error types for the image store

use std::fmt;

#[derive(Debug)]
pub enum ImageStoreError {
    InvalidFormat(String),
    Io(Box<std::io::Error>),
    IndexCorrupt(String),
    Config(String),
}

impl fmt::Display for ImageStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageStoreError::InvalidFormat(msg) => write!(f, "Invalid image data: {}", msg),
            ImageStoreError::Io(err) => write!(f, "IO error: {}", err),
            ImageStoreError::IndexCorrupt(msg) => write!(f, "Corrupt metadata index: {}", msg),
            ImageStoreError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ImageStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageStoreError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImageStoreError {
    fn from(err: std::io::Error) -> Self {
        ImageStoreError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for ImageStoreError {
    fn from(err: serde_json::Error) -> Self {
        ImageStoreError::IndexCorrupt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImageStoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_format_display() {
        let err = ImageStoreError::InvalidFormat("not a data URI".to_string());
        assert_eq!(format!("{}", err), "Invalid image data: not a data URI");
    }

    #[test]
    fn test_config_error_display() {
        let err = ImageStoreError::Config("max_storage_mb must be > 0".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: max_storage_mb must be > 0"
        );
    }

    #[test]
    fn test_io_error_has_source() {
        let err: ImageStoreError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(format!("{}", err).contains("gone"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_json_error_maps_to_index_corrupt() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: ImageStoreError = json_err.into();
        assert!(matches!(err, ImageStoreError::IndexCorrupt(_)));
        assert!(err.source().is_none());
    }
}
