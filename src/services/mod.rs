//! Services separating frontend concerns from collection logic

pub mod progress;

#[cfg(feature = "cli")]
pub use progress::BarProgressReporter;
pub use progress::{
    create_cli_progress_reporter, ConsoleProgressReporter, DownloadUpdate, NoOpProgressReporter,
    ProgressReporter,
};
