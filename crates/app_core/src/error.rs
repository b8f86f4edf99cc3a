//! Application error types

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (the viewer keeps running) =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    // ===== Unrecoverable Errors =====
    #[error("Image loader unavailable: {0}")]
    SystemResource(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid catalog: {0}")]
    Catalog(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Io(_)
                | AppError::AssetNotFound(_)
                | AppError::Fetch(_)
                | AppError::UnsupportedFormat(_)
                | AppError::ImageDecode(_)
        )
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Unsupported(u) => AppError::UnsupportedFormat(u.to_string()),
            other => AppError::ImageDecode(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Fetch(e.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(e: toml::ser::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_failures_are_recoverable() {
        assert!(AppError::ImageDecode("bad header".into()).is_recoverable());
        assert!(AppError::Fetch("404".into()).is_recoverable());
        assert!(!AppError::SystemResource("loader stopped".into()).is_recoverable());
        assert!(!AppError::Catalog("empty".into()).is_recoverable());
    }
}
