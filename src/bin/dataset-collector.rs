//! Dataset collector CLI tool
//!
//! Downloads per-class image sets from URL manifests and prunes files that
//! fail to decode.

#[cfg(feature = "cli")]
use dataset_collector::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
