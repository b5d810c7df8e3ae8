//! Report and state types shared by the collector, progress reporting and CLI

use crate::fetch::SkipReason;
use crate::status::CollectionStatus;
use crate::validation::ValidationReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Lifecycle of a class within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassState {
    /// No class directory yet
    Uninitialized,
    /// Marker is `NOT-OK`; files will be purged and downloaded again
    NeedsCollection,
    /// Downloads in progress
    Collecting,
    /// Marker is `OK`, validation pending
    Collected,
    /// Validation pass finished; terminal for this run
    Validated,
}

impl ClassState {
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Uninitialized => "Creating class directory",
            Self::NeedsCollection => "Collection required",
            Self::Collecting => "Downloading images",
            Self::Collected => "Images collected",
            Self::Validated => "Validation finished",
        }
    }
}

impl fmt::Display for ClassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A manifest URL that did not produce a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUrl {
    pub url: String,
    pub reason: SkipReason,
}

/// What happened to one class during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class_name: String,
    /// Whether the download step ran (marker was not `OK`)
    pub collection_ran: bool,
    /// Files written by the download step
    pub downloaded: usize,
    /// URLs that were skipped, in manifest order
    pub skipped: Vec<SkippedUrl>,
    pub validation: ValidationReport,
    pub final_state: ClassState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ClassReport {
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Image files left on disk after validation
    #[must_use]
    pub fn remaining_images(&self) -> usize {
        self.validation.kept
    }
}

/// Reports for every class processed by a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub dataset_root: PathBuf,
    pub classes: Vec<ClassReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    #[must_use]
    pub fn total_downloaded(&self) -> usize {
        self.classes.iter().map(|c| c.downloaded).sum()
    }

    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.classes.iter().map(ClassReport::skipped_count).sum()
    }

    #[must_use]
    pub fn total_deleted(&self) -> usize {
        self.classes.iter().map(|c| c.validation.deleted_count()).sum()
    }

    #[must_use]
    pub fn class(&self, class_name: &str) -> Option<&ClassReport> {
        self.classes.iter().find(|c| c.class_name == class_name)
    }
}

/// Read-only snapshot of a class on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInventory {
    pub class_name: String,
    /// URL count, `None` when the manifest is missing
    pub manifest_urls: Option<usize>,
    /// Marker state, `None` when the class directory or marker is missing
    pub status: Option<CollectionStatus>,
    /// Files in the class directory other than the marker
    pub image_files: usize,
}
