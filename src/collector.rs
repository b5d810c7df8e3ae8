//! Dataset collector
//!
//! Drives each configured class through
//! `Uninitialized → NeedsCollection → Collecting → Collected → Validated`.
//! A class whose marker is not `OK` is purged and downloaded from scratch;
//! the marker only turns `OK` once every manifest URL has been attempted, so
//! an interrupted run is repeated in full next time.

use crate::config::{validate_class_name, CollectorConfig};
use crate::error::{CollectorError, Result};
use crate::fetch::{FetchOutcome, HttpFetcher, ImageFetcher};
use crate::manifest::ClassManifest;
use crate::services::{DownloadUpdate, NoOpProgressReporter, ProgressReporter};
use crate::status::{CollectionStatus, StatusMarker};
use crate::tracing_config::spans;
use crate::types::{ClassInventory, ClassReport, ClassState, RunReport, SkippedUrl};
use crate::validation::{list_image_files, ImageValidator};
use chrono::Utc;
use std::fs;
use std::path::Path;
use tracing::Instrument;

/// Collects and validates image datasets class by class
pub struct DatasetCollector {
    config: CollectorConfig,
    fetcher: Box<dyn ImageFetcher>,
    progress: Box<dyn ProgressReporter>,
}

impl DatasetCollector {
    /// Create a collector that downloads over HTTP
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Failed to create HTTP client
    pub fn new(config: CollectorConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, Box::new(fetcher))
    }

    /// Create a collector with a custom fetcher
    pub fn with_fetcher(config: CollectorConfig, fetcher: Box<dyn ImageFetcher>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
            progress: Box::new(NoOpProgressReporter),
        })
    }

    /// Replace the progress reporter
    #[must_use]
    pub fn with_progress_reporter(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Collect every configured class in order
    ///
    /// The dataset root and every manifest are checked before any class is
    /// touched, so a configuration error never leaves a run half done.
    ///
    /// # Errors
    /// - Dataset root or a manifest is missing (configuration error)
    /// - Filesystem failures while writing or pruning files
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        self.preflight()?;

        let mut classes = Vec::with_capacity(self.config.classes.len());
        for class_name in &self.config.classes {
            let manifest_path = self.config.manifest_path(class_name);
            let class_dir = self.config.class_dir(class_name);
            classes.push(self.collect(class_name, &manifest_path, &class_dir).await?);
        }

        Ok(RunReport {
            dataset_root: self.config.dataset_root.clone(),
            classes,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Check the dataset root and every configured manifest without
    /// touching the dataset
    ///
    /// Anything that modifies markers ahead of a run (such as
    /// [`reset`](Self::reset)) should call this first.
    ///
    /// # Errors
    /// - Dataset root or a manifest is missing (configuration error)
    pub fn preflight(&self) -> Result<()> {
        self.ensure_dataset_root()?;

        for class_name in &self.config.classes {
            let manifest_path = self.config.manifest_path(class_name);
            if !manifest_path.is_file() {
                return Err(CollectorError::missing_path(
                    &format!("Manifest for class '{}'", class_name),
                    &manifest_path,
                    "Place one URL per line in this file.",
                ));
            }
        }

        Ok(())
    }

    /// Ensure a decodable image set exists for one class
    ///
    /// Downloads the manifest into `class_dir` when the marker is missing
    /// or not `OK`, then always runs the validation pass.
    ///
    /// # Errors
    /// - Manifest is missing or the marker holds unrecognised content
    ///   (configuration errors)
    /// - Filesystem failures
    pub async fn collect(
        &self,
        class_name: &str,
        manifest_path: &Path,
        class_dir: &Path,
    ) -> Result<ClassReport> {
        let span = spans::class_collection(class_name, class_dir);
        self.collect_inner(class_name, manifest_path, class_dir)
            .instrument(span)
            .await
    }

    async fn collect_inner(
        &self,
        class_name: &str,
        manifest_path: &Path,
        class_dir: &Path,
    ) -> Result<ClassReport> {
        validate_class_name(class_name)?;
        let started_at = Utc::now();
        let manifest = ClassManifest::load(class_name, manifest_path)?;
        let marker = StatusMarker::new(class_dir, &self.config.status_file_name);

        if !class_dir.exists() {
            self.progress.report_state(class_name, ClassState::Uninitialized);
            fs::create_dir_all(class_dir)
                .map_err(|e| CollectorError::file_io_error("create class directory", class_dir, &e))?;
            marker.write(CollectionStatus::Incomplete)?;
        }
        if marker.ensure_exists()? {
            tracing::debug!(marker = %marker.path().display(), "Missing status marker recreated");
        }

        let status = marker.read()?.unwrap_or(CollectionStatus::Incomplete);
        let collection_ran = !status.is_complete();
        let mut downloaded = 0;
        let mut skipped = Vec::new();

        if collection_ran {
            self.progress.report_state(class_name, ClassState::NeedsCollection);
            tracing::info!("collecting {} images...", class_name);

            let purged = self.purge_class_dir(class_dir, &marker)?;
            if purged > 0 {
                tracing::debug!(purged, "Removed files from previous collection");
            }

            self.progress.report_state(class_name, ClassState::Collecting);
            let (count, skips) = self.download_manifest(&manifest, class_dir).await?;
            downloaded = count;
            skipped = skips;

            tracing::info!("collected {} images", downloaded);
            if !skipped.is_empty() {
                tracing::info!("skipped {} urls", skipped.len());
            }
            marker.write(CollectionStatus::Complete)?;
        } else {
            tracing::info!("{} images already collected", class_name);
        }
        self.progress.report_state(class_name, ClassState::Collected);

        tracing::info!("checking corrupted images");
        let validation = {
            let _guard = spans::validation(class_dir).entered();
            ImageValidator::prune(class_dir, &self.config.status_file_name)?
        };
        tracing::info!("deleted {} images", validation.deleted_count());
        self.progress.report_state(class_name, ClassState::Validated);

        let report = ClassReport {
            class_name: class_name.to_string(),
            collection_ran,
            downloaded,
            skipped,
            validation,
            final_state: ClassState::Validated,
            started_at,
            finished_at: Utc::now(),
        };
        self.progress.report_class_finished(&report);
        Ok(report)
    }

    /// Mark the marker incomplete, then delete every other file
    fn purge_class_dir(&self, class_dir: &Path, marker: &StatusMarker) -> Result<usize> {
        marker.write(CollectionStatus::Incomplete)?;

        let files = list_image_files(class_dir, &self.config.status_file_name)?;
        for path in &files {
            fs::remove_file(path)
                .map_err(|e| CollectorError::file_io_error("remove previous download", path, &e))?;
        }
        Ok(files.len())
    }

    /// Attempt every URL in order; the file counter only advances on success
    async fn download_manifest(
        &self,
        manifest: &ClassManifest,
        class_dir: &Path,
    ) -> Result<(usize, Vec<SkippedUrl>)> {
        let mut counter = 0usize;
        let mut skipped = Vec::new();
        let total = manifest.len();

        for (index, url) in manifest.urls().iter().enumerate() {
            let outcome = self
                .fetcher
                .fetch(url)
                .instrument(spans::download(url, index))
                .await;

            self.progress.report_download(&DownloadUpdate {
                class_name: manifest.class_name(),
                index,
                total,
                url,
                outcome: &outcome,
            });

            match outcome {
                FetchOutcome::Fetched(bytes) => {
                    let path = class_dir.join(image_file_name(counter, &self.config.image_extension));
                    tokio::fs::write(&path, &bytes)
                        .await
                        .map_err(|e| CollectorError::file_io_error("write image", &path, &e))?;
                    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Image saved");
                    counter += 1;
                },
                FetchOutcome::Skipped(reason) => {
                    tracing::info!("error downloading {}...skipping ({})", url, reason);
                    skipped.push(SkippedUrl {
                        url: url.clone(),
                        reason,
                    });
                },
            }
        }

        Ok((counter, skipped))
    }

    /// Force a class to be collected again on the next run
    ///
    /// Returns `false` when the class directory does not exist yet, in
    /// which case the next run collects it anyway.
    pub fn reset(&self, class_name: &str) -> Result<bool> {
        validate_class_name(class_name)?;
        let class_dir = self.config.class_dir(class_name);
        if !class_dir.is_dir() {
            return Ok(false);
        }

        StatusMarker::new(&class_dir, &self.config.status_file_name)
            .write(CollectionStatus::Incomplete)?;
        tracing::info!(class = %class_name, "Status reset to {}", CollectionStatus::Incomplete);
        Ok(true)
    }

    /// Snapshot the configured classes without modifying anything
    pub fn inspect(&self) -> Result<Vec<ClassInventory>> {
        self.ensure_dataset_root()?;

        self.config
            .classes
            .iter()
            .map(|class_name| -> Result<ClassInventory> {
                let manifest_path = self.config.manifest_path(class_name);
                let manifest_urls = if manifest_path.is_file() {
                    Some(ClassManifest::load(class_name.as_str(), &manifest_path)?.len())
                } else {
                    None
                };

                let class_dir = self.config.class_dir(class_name);
                let (status, image_files) = if class_dir.is_dir() {
                    let marker = StatusMarker::new(&class_dir, &self.config.status_file_name);
                    (
                        marker.read()?,
                        list_image_files(&class_dir, &self.config.status_file_name)?.len(),
                    )
                } else {
                    (None, 0)
                };

                Ok(ClassInventory {
                    class_name: class_name.clone(),
                    manifest_urls,
                    status,
                    image_files,
                })
            })
            .collect()
    }

    fn ensure_dataset_root(&self) -> Result<()> {
        if self.config.dataset_root.is_dir() {
            Ok(())
        } else {
            Err(CollectorError::missing_path(
                "Dataset root",
                &self.config.dataset_root,
                "Create the dataset folder and place the <class>.txt manifests inside it.",
            ))
        }
    }
}

/// `{counter:08}.{extension}`
#[must_use]
pub fn image_file_name(counter: usize, extension: &str) -> String {
    format!("{:08}.{}", counter, extension)
}
