//! Error types for dataset collection

use std::path::Path;
use thiserror::Error;

/// Result type alias for dataset collection operations
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Error taxonomy for the collector
///
/// Per-URL transport failures are not represented here: they are recovered
/// locally and surface as [`crate::fetch::SkipReason`] values instead.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Input/output errors (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing manifest, missing dataset root, malformed marker or settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client could not be constructed
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A downloaded file is not a decodable image
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration file could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CollectorError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create network error with context
    pub fn network_error<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create decode error for a file on disk
    pub fn image_decode_error<P: AsRef<Path>>(path: P, error: &image::ImageError) -> Self {
        let path_display = path.as_ref().display();
        Self::Decode(format!("Failed to decode image '{}': {}", path_display, error))
    }

    /// Create configuration error for a missing required path
    pub fn missing_path<P: AsRef<Path>>(what: &str, path: P, hint: &str) -> Self {
        let hint_text = if hint.is_empty() {
            String::new()
        } else {
            format!(" {}", hint)
        };
        Self::InvalidConfig(format!(
            "{} not found: '{}'.{}",
            what,
            path.as_ref().display(),
            hint_text
        ))
    }

    /// True for errors that abort the whole run because of bad setup
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::Serialization(_))
    }
}
