#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Dataset Collector
//!
//! Builds on-disk image classification datasets from per-class URL
//! manifests.
//!
//! For each configured class the collector reads `<root>/<class>.txt`,
//! downloads every URL into `<root>/<class>/00000000.jpg`,
//! `00000001.jpg`, … and records completion in `<root>/<class>/status.txt`.
//! Classes whose marker already reads `OK` are not downloaded again. A
//! validation pass then decodes every file and deletes the ones that are
//! not images.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dataset_collector::{CollectorConfig, DatasetCollector};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CollectorConfig::builder()
//!     .dataset_root("/data/clothing_classifier")
//!     .classes(["sunglasses", "jeans", "dress"])
//!     .build()?;
//!
//! let collector = DatasetCollector::new(config)?;
//! let report = collector.run().await?;
//! println!("downloaded {} images", report.total_downloaded());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): command-line interface, progress bar and subscriber setup
//! - `webp-support` (default): WebP decoding during validation
//! - `tracing-json`: JSON log output

pub mod collector;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod services;
pub mod status;
pub mod tracing_config;
pub mod types;
pub mod validation;

#[cfg(feature = "cli")]
pub mod cli;

// Public API exports
pub use collector::{image_file_name, DatasetCollector};
pub use config::{CollectorConfig, CollectorConfigBuilder};
pub use error::{CollectorError, Result};
pub use fetch::{FetchOutcome, HttpFetcher, ImageFetcher, SkipReason};
pub use manifest::ClassManifest;
pub use services::{
    ConsoleProgressReporter, DownloadUpdate, NoOpProgressReporter, ProgressReporter,
};
pub use status::{CollectionStatus, StatusMarker};
pub use types::{ClassInventory, ClassReport, ClassState, RunReport, SkippedUrl};
pub use validation::{ImageValidator, ValidationReport};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;
pub use tracing_config::{spans, TracingConfig, TracingFormat};
