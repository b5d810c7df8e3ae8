//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::config::{CollectorConfig, CollectorConfigBuilder};
use anyhow::{Context, Result};

/// Convert CLI arguments to a `CollectorConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the configuration: defaults, then `--config` file, then flags
    pub(crate) fn from_cli(cli: &Cli) -> Result<CollectorConfig> {
        let base = match &cli.config {
            Some(path) => CollectorConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => CollectorConfig::default(),
        };

        let mut builder = CollectorConfigBuilder::from_config(base);

        if let Some(root) = &cli.dataset_root {
            builder = builder.dataset_root(root.clone());
        }
        if !cli.classes.is_empty() {
            builder = builder.classes(cli.classes.iter().cloned());
        }
        if let Some(timeout) = cli.timeout {
            builder = builder.request_timeout_secs(timeout);
        }
        if let Some(extension) = &cli.extension {
            builder = builder.image_extension(extension.clone());
        }
        if cli.accept_error_status {
            builder = builder.accept_error_status(true);
        }

        builder.build().context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "dataset-collector",
            "--dataset-root",
            "/srv/clothes",
            "-c",
            "hats",
            "-c",
            "scarves",
            "--timeout",
            "15",
            "--extension",
            ".png",
            "--accept-error-status",
        ])
        .unwrap();

        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.dataset_root, PathBuf::from("/srv/clothes"));
        assert_eq!(config.classes, vec!["hats", "scarves"]);
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.image_extension, "png");
        assert!(config.accept_error_status);
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("collector.json");
        std::fs::write(
            &path,
            r#"{ "dataset_root": "/from/file", "classes": ["dress"], "request_timeout_secs": 90 }"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "dataset-collector",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "5",
        ])
        .unwrap();

        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.dataset_root, PathBuf::from("/from/file"));
        assert_eq!(config.classes, vec!["dress"]);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_flags_are_rejected() {
        let cli = Cli::try_parse_from(["dataset-collector", "--timeout", "0"]).unwrap();
        assert!(CliConfigBuilder::from_cli(&cli).is_err());

        let cli = Cli::try_parse_from(["dataset-collector", "-c", "a/b"]).unwrap();
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }
}
