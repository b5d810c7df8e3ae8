//! Dataset collector CLI
//!
//! Command-line interface for collecting and validating per-class image
//! datasets.

use super::config::CliConfigBuilder;
use crate::{
    collector::DatasetCollector, services::create_cli_progress_reporter,
    tracing_config::init_cli_tracing, types::RunReport,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Collect per-class image datasets from URL manifests
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "dataset-collector")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Dataset root holding the <class>.txt manifests [default: $DATASET_COLLECTOR_ROOT or the user data directory]
    #[arg(short, long, value_name = "PATH")]
    pub dataset_root: Option<PathBuf>,

    /// Class to collect, repeatable [default: sunglasses, jeans, dress]
    #[arg(short, long = "class", value_name = "NAME")]
    pub classes: Vec<String>,

    /// JSON configuration file; command-line flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds [default: 60]
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Extension for downloaded files [default: jpg]
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Keep bodies of non-success HTTP responses and leave them to validation
    #[arg(long)]
    pub accept_error_status: bool,

    /// Mark the selected classes incomplete so they are downloaded again
    #[arg(long)]
    pub force: bool,

    /// Show manifest and status information for each class and exit
    #[arg(long)]
    pub list: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Plain log output on stderr, without colors
    #[arg(long)]
    pub plain: bool,

    /// Show a progress bar while downloading
    #[arg(long)]
    pub progress: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose, cli.plain).context("Failed to initialize tracing")?;

    run(&cli).await
}

/// Execute a parsed command line
pub async fn run(cli: &Cli) -> Result<()> {
    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;

    let reporter = create_cli_progress_reporter(cli.progress, cli.verbose >= 1);
    let collector = DatasetCollector::new(config)
        .context("Failed to create dataset collector")?
        .with_progress_reporter(reporter);

    if cli.list {
        return list_classes(&collector);
    }

    if cli.force {
        collector
            .preflight()
            .context("Dataset collection failed")?;
        for class_name in &collector.config().classes {
            collector
                .reset(class_name)
                .with_context(|| format!("Failed to reset class '{}'", class_name))?;
        }
    }

    info!("Dataset root: {}", collector.config().dataset_root.display());
    info!("Classes: {}", collector.config().classes.join(", "));

    let start_time = Instant::now();
    let report = collector.run().await.context("Dataset collection failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize run report")?
        );
    } else {
        print_summary(&report);
    }

    info!(
        "Processed {} class(es) in {:.2}s",
        report.classes.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Print per-class status without touching the dataset
fn list_classes(collector: &DatasetCollector) -> Result<()> {
    let inventory = collector.inspect().context("Failed to inspect dataset")?;

    println!(
        "📦 Dataset root: {}",
        collector.config().dataset_root.display()
    );
    for class in inventory {
        let manifest = class
            .manifest_urls
            .map_or_else(|| "missing manifest".to_string(), |n| format!("{} urls", n));
        let status = class
            .status
            .map_or_else(|| "not collected".to_string(), |s| s.to_string());
        println!(
            "  • {}: {}, status {}, {} file(s)",
            class.class_name, manifest, status, class.image_files
        );
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("📊 Collection summary");
    for class in &report.classes {
        let mode = if class.collection_ran {
            "collected"
        } else {
            "already collected"
        };
        println!(
            "  • {} ({}): {} downloaded, {} skipped, {} deleted, {} remaining",
            class.class_name,
            mode,
            class.downloaded,
            class.skipped_count(),
            class.validation.deleted_count(),
            class.remaining_images()
        );
    }
    println!(
        "  Total: {} downloaded, {} skipped, {} deleted",
        report.total_downloaded(),
        report.total_skipped(),
        report.total_deleted()
    );
}
