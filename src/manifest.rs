//! Per-class URL manifests
//!
//! A manifest is a plain text file named `<class>.txt` holding one image
//! URL per line.

use crate::error::{CollectorError, Result};
use std::path::Path;

/// Class name plus the ordered URLs to download for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassManifest {
    class_name: String,
    urls: Vec<String>,
}

impl ClassManifest {
    /// Build a manifest from already-parsed URLs
    pub fn new<S: Into<String>>(class_name: S, urls: Vec<String>) -> Result<Self> {
        let class_name = class_name.into();
        crate::config::validate_class_name(&class_name)?;
        Ok(Self { class_name, urls })
    }

    /// Read a manifest file
    ///
    /// # Errors
    /// - The file does not exist (configuration error, aborts the run)
    /// - The file cannot be read
    pub fn load<S: Into<String>, P: AsRef<Path>>(class_name: S, path: P) -> Result<Self> {
        let class_name = class_name.into();
        let path = path.as_ref();

        if !path.is_file() {
            return Err(CollectorError::missing_path(
                &format!("Manifest for class '{}'", class_name),
                path,
                "Place one URL per line in this file.",
            ));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CollectorError::file_io_error("read manifest", path, &e))?;

        Self::new(class_name, parse_urls(&content))
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// URLs in file order
    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Split manifest content into trimmed, non-empty lines
fn parse_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
