//! Configuration types for dataset collection

use crate::error::{CollectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the dataset root
pub const DATASET_ROOT_ENV: &str = "DATASET_COLLECTOR_ROOT";

/// Classes collected when none are configured
pub const DEFAULT_CLASSES: &[&str] = &["sunglasses", "jeans", "dress"];

/// Name of the per-class status marker file
pub const DEFAULT_STATUS_FILE: &str = "status.txt";

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Upper bound for a single downloaded image (50 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

/// Configuration for a collection run
///
/// Every path the collector touches is derived from `dataset_root`:
/// manifests live at `<root>/<class>.txt` and images at `<root>/<class>/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Directory holding the class manifests and class directories
    pub dataset_root: PathBuf,

    /// Classes to collect, processed in order
    pub classes: Vec<String>,

    /// Timeout applied to each HTTP request
    pub request_timeout_secs: u64,

    /// Extension given to downloaded files (without the dot)
    pub image_extension: String,

    /// File name of the per-class status marker
    pub status_file_name: String,

    /// Write bodies of non-success HTTP responses instead of skipping them
    pub accept_error_status: bool,

    /// Responses larger than this are skipped
    pub max_image_bytes: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            dataset_root: Self::default_dataset_root(),
            classes: DEFAULT_CLASSES.iter().map(|c| (*c).to_string()).collect(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            image_extension: "jpg".to_string(),
            status_file_name: DEFAULT_STATUS_FILE.to_string(),
            accept_error_status: false,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            user_agent: format!("dataset-collector/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CollectorConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use dataset_collector::CollectorConfig;
    ///
    /// let config = CollectorConfig::builder()
    ///     .dataset_root("/data/clothing_classifier")
    ///     .classes(["sunglasses", "jeans"])
    ///     .request_timeout_secs(30)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.classes.len(), 2);
    /// ```
    #[must_use]
    pub fn builder() -> CollectorConfigBuilder {
        CollectorConfigBuilder::default()
    }

    /// Resolve the default dataset root
    ///
    /// `DATASET_COLLECTOR_ROOT` wins; otherwise the user data directory is
    /// used, falling back to a relative `data/` directory.
    #[must_use]
    pub fn default_dataset_root() -> PathBuf {
        if let Ok(root_override) = std::env::var(DATASET_ROOT_ENV) {
            if !root_override.trim().is_empty() {
                return PathBuf::from(root_override);
            }
        }

        dirs::data_dir()
            .map_or_else(|| PathBuf::from("data"), |dir| dir.join("dataset-collector"))
            .join("clothing_classifier")
    }

    /// Load configuration from a JSON file
    ///
    /// Missing fields take their default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CollectorError::file_io_error("read config file", path, &e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Request timeout as a `Duration`
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Path of the manifest for a class
    #[must_use]
    pub fn manifest_path(&self, class_name: &str) -> PathBuf {
        self.dataset_root.join(format!("{}.txt", class_name))
    }

    /// Directory holding the images of a class
    #[must_use]
    pub fn class_dir(&self, class_name: &str) -> PathBuf {
        self.dataset_root.join(class_name)
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Empty class list, or a class name that is empty or not a plain file name
    /// - Zero request timeout or zero size limit
    /// - Empty or dotted image extension, empty status file name
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(CollectorError::invalid_config(
                "At least one class must be configured",
            ));
        }

        for class_name in &self.classes {
            validate_class_name(class_name)?;
        }

        if self.request_timeout_secs == 0 {
            return Err(CollectorError::invalid_config(
                "Request timeout must be at least 1 second",
            ));
        }

        if self.max_image_bytes == 0 {
            return Err(CollectorError::invalid_config(
                "Maximum image size must be greater than zero",
            ));
        }

        if self.image_extension.is_empty()
            || self.image_extension.contains(['.', '/', '\\'])
        {
            return Err(CollectorError::invalid_config(format!(
                "Invalid image extension '{}': expected something like 'jpg'",
                self.image_extension
            )));
        }

        if self.status_file_name.trim().is_empty()
            || self.status_file_name.contains(['/', '\\'])
        {
            return Err(CollectorError::invalid_config(format!(
                "Invalid status file name '{}'",
                self.status_file_name
            )));
        }

        Ok(())
    }
}

/// Check that a class name can be used as a file name inside the dataset root
pub fn validate_class_name(class_name: &str) -> Result<()> {
    if class_name.trim().is_empty() {
        return Err(CollectorError::invalid_config("Class name cannot be empty"));
    }

    if class_name == "." || class_name == ".." || class_name.contains(['/', '\\']) {
        return Err(CollectorError::invalid_config(format!(
            "Invalid class name '{}': must be a plain directory name",
            class_name
        )));
    }

    Ok(())
}

/// Builder for `CollectorConfig`
#[derive(Debug, Default)]
pub struct CollectorConfigBuilder {
    config: CollectorConfig,
}

impl CollectorConfigBuilder {
    /// Start from an existing configuration
    #[must_use]
    pub fn from_config(config: CollectorConfig) -> Self {
        Self { config }
    }

    /// Set dataset root
    #[must_use]
    pub fn dataset_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.dataset_root = root.into();
        self
    }

    /// Replace the class list
    #[must_use]
    pub fn classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Set request timeout in seconds
    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// Set downloaded file extension
    #[must_use]
    pub fn image_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.config.image_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Set status marker file name
    #[must_use]
    pub fn status_file_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.status_file_name = name.into();
        self
    }

    /// Keep bodies of non-success responses
    #[must_use]
    pub fn accept_error_status(mut self, accept: bool) -> Self {
        self.config.accept_error_status = accept;
        self
    }

    /// Set per-image size limit
    #[must_use]
    pub fn max_image_bytes(mut self, bytes: u64) -> Self {
        self.config.max_image_bytes = bytes;
        self
    }

    /// Set User-Agent header
    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<CollectorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
