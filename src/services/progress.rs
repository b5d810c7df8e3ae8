//! Progress reporting service
//!
//! This module separates progress reporting concerns from the collection
//! logic, allowing different frontends to implement their own progress
//! handling.

use crate::fetch::FetchOutcome;
use crate::types::{ClassReport, ClassState};
use instant::Instant;

/// Progress of a single download within a class
#[derive(Debug, Clone)]
pub struct DownloadUpdate<'a> {
    pub class_name: &'a str,
    /// Zero-based position of the URL in the manifest
    pub index: usize,
    /// Number of URLs in the manifest
    pub total: usize,
    pub url: &'a str,
    pub outcome: &'a FetchOutcome,
}

/// Trait for reporting progress during a collection run
pub trait ProgressReporter: Send + Sync {
    /// A class entered a new state
    fn report_state(&self, class_name: &str, state: ClassState);

    /// One manifest URL was attempted
    fn report_download(&self, update: &DownloadUpdate<'_>);

    /// A class finished its validation pass
    fn report_class_finished(&self, report: &ClassReport);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_state(&self, _class_name: &str, _state: ClassState) {}

    fn report_download(&self, _update: &DownloadUpdate<'_>) {}

    fn report_class_finished(&self, _report: &ClassReport) {}
}

/// Console progress reporter that logs through `tracing`
pub struct ConsoleProgressReporter {
    verbose: bool,
    start_time: Instant,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// # Arguments
    /// * `verbose` - Whether to log every successful download as well
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            start_time: Instant::now(),
        }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_state(&self, class_name: &str, state: ClassState) {
        tracing::debug!(
            class = %class_name,
            elapsed_ms = self.start_time.elapsed().as_millis() as u64,
            "{}",
            state.description()
        );
    }

    fn report_download(&self, update: &DownloadUpdate<'_>) {
        if self.verbose && update.outcome.is_fetched() {
            tracing::info!(
                "[{}/{}] {} downloaded",
                update.index + 1,
                update.total,
                update.url
            );
        }
    }

    fn report_class_finished(&self, report: &ClassReport) {
        tracing::info!(
            class = %report.class_name,
            downloaded = report.downloaded,
            skipped = report.skipped_count(),
            deleted = report.validation.deleted_count(),
            remaining = report.remaining_images(),
            "✅ {} ready ({}ms elapsed)",
            report.class_name,
            self.start_time.elapsed().as_millis()
        );
    }
}

/// Progress bar reporter for interactive terminals
#[cfg(feature = "cli")]
pub struct BarProgressReporter {
    bar: indicatif::ProgressBar,
}

#[cfg(feature = "cli")]
impl BarProgressReporter {
    #[must_use]
    pub fn new() -> Self {
        let bar = indicatif::ProgressBar::new(0);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }
}

#[cfg(feature = "cli")]
impl Default for BarProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "cli")]
impl ProgressReporter for BarProgressReporter {
    fn report_state(&self, class_name: &str, state: ClassState) {
        if state == ClassState::Collecting {
            self.bar.reset();
            self.bar.set_position(0);
        }
        self.bar
            .set_message(format!("{}: {}", class_name, state.description()));
    }

    fn report_download(&self, update: &DownloadUpdate<'_>) {
        self.bar.set_length(update.total as u64);
        self.bar.set_position(update.index as u64 + 1);
    }

    fn report_class_finished(&self, report: &ClassReport) {
        self.bar.println(format!(
            "✅ {}: {} downloaded, {} skipped, {} deleted",
            report.class_name,
            report.downloaded,
            report.skipped_count(),
            report.validation.deleted_count()
        ));
    }
}

/// Create appropriate progress reporter based on CLI flags
///
/// # Arguments
/// * `enable_progress` - Whether the --progress flag was set
/// * `verbose` - Whether verbose logging is enabled
pub fn create_cli_progress_reporter(
    enable_progress: bool,
    verbose: bool,
) -> Box<dyn ProgressReporter> {
    #[cfg(feature = "cli")]
    if enable_progress {
        return Box::new(BarProgressReporter::new());
    }
    #[cfg(not(feature = "cli"))]
    let _ = enable_progress;

    Box::new(ConsoleProgressReporter::new(verbose))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationReport;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    // Mock progress reporter for testing
    struct RecordingReporter {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report_state(&self, class_name: &str, state: ClassState) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{:?}", class_name, state));
        }

        fn report_download(&self, update: &DownloadUpdate<'_>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}/{}", update.index + 1, update.total));
        }

        fn report_class_finished(&self, report: &ClassReport) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done:{}", report.class_name));
        }
    }

    fn empty_report() -> ClassReport {
        let now = Utc::now();
        ClassReport {
            class_name: "jeans".to_string(),
            collection_ran: false,
            downloaded: 0,
            skipped: Vec::new(),
            validation: ValidationReport::default(),
            final_state: ClassState::Validated,
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn test_reporter_trait_object_dispatch() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let reporter: Box<dyn ProgressReporter> = Box::new(RecordingReporter {
            events: Arc::clone(&events),
        });

        let outcome = FetchOutcome::Fetched(vec![1, 2, 3]);
        reporter.report_state("jeans", ClassState::Collecting);
        reporter.report_download(&DownloadUpdate {
            class_name: "jeans",
            index: 0,
            total: 2,
            url: "http://example.com/a.jpg",
            outcome: &outcome,
        });
        reporter.report_class_finished(&empty_report());

        let events = events.lock().unwrap();
        assert_eq!(*events, vec!["jeans:Collecting", "1/2", "done:jeans"]);
    }

    #[test]
    fn test_builtin_reporters_do_not_panic() {
        let outcome = FetchOutcome::Fetched(Vec::new());
        let update = DownloadUpdate {
            class_name: "dress",
            index: 4,
            total: 5,
            url: "http://example.com/e.jpg",
            outcome: &outcome,
        };

        let reporters: Vec<Box<dyn ProgressReporter>> = vec![
            create_cli_progress_reporter(false, true),
            create_cli_progress_reporter(true, false),
            Box::new(NoOpProgressReporter),
        ];
        for reporter in reporters {
            reporter.report_state("dress", ClassState::Collecting);
            reporter.report_download(&update);
            reporter.report_class_finished(&empty_report());
        }
    }
}
