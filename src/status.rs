//! Per-class status marker
//!
//! Each class directory carries a single-token file recording whether the
//! last collection pass finished. Anything other than a recognised token is
//! rejected instead of being read as "incomplete".

use crate::error::{CollectorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Token written for a finished collection pass
pub const COMPLETE_TOKEN: &str = "OK";

/// Token written before and during a collection pass
pub const INCOMPLETE_TOKEN: &str = "NOT-OK";

/// Spelling used by older collection scripts for an incomplete pass
const LEGACY_INCOMPLETE_TOKEN: &str = "NOK";

/// Scratch file the marker is staged in before being renamed into place
pub(crate) fn staging_file_name(marker_name: &str) -> String {
    format!(".{}.tmp", marker_name)
}

/// Persisted collection state of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionStatus {
    /// Collection pass finished (`OK`)
    Complete,
    /// Collection missing, interrupted, or forced to rerun (`NOT-OK`)
    Incomplete,
}

impl CollectionStatus {
    /// Token persisted in the marker file
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Complete => COMPLETE_TOKEN,
            Self::Incomplete => INCOMPLETE_TOKEN,
        }
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for CollectionStatus {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            COMPLETE_TOKEN => Ok(Self::Complete),
            INCOMPLETE_TOKEN | LEGACY_INCOMPLETE_TOKEN => Ok(Self::Incomplete),
            other => Err(CollectorError::invalid_config(format!(
                "Unrecognized status marker content '{}': expected '{}' or '{}'",
                other, COMPLETE_TOKEN, INCOMPLETE_TOKEN
            ))),
        }
    }
}

/// Status marker file inside a class directory
#[derive(Debug, Clone)]
pub struct StatusMarker {
    path: PathBuf,
}

impl StatusMarker {
    /// Marker `file_name` inside `class_dir`
    #[must_use]
    pub fn new<P: AsRef<Path>>(class_dir: P, file_name: &str) -> Self {
        Self {
            path: class_dir.as_ref().join(file_name),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the marker, `None` when the file is absent
    ///
    /// # Errors
    /// - Marker content is not a recognised token (configuration error)
    /// - Marker cannot be read
    pub fn read(&self) -> Result<Option<CollectionStatus>> {
        if !self.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| CollectorError::file_io_error("read status marker", &self.path, &e))?;

        content
            .parse::<CollectionStatus>()
            .map(Some)
            .map_err(|e| match e {
                CollectorError::InvalidConfig(msg) => CollectorError::invalid_config(format!(
                    "{} (in {})",
                    msg,
                    self.path.display()
                )),
                other => other,
            })
    }

    /// Persist a status token
    ///
    /// The token is written to a sibling staging file and renamed over the
    /// marker, so an interrupted write leaves the previous token in place.
    pub fn write(&self, status: CollectionStatus) -> Result<()> {
        let staging = self.staging_path();
        let staged = File::create(&staging).and_then(|mut file| {
            file.write_all(status.token().as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = staged {
            let _ = fs::remove_file(&staging);
            return Err(CollectorError::file_io_error("stage status marker", &staging, &e));
        }

        fs::rename(&staging, &self.path)
            .map_err(|e| CollectorError::file_io_error("write status marker", &self.path, &e))?;
        tracing::debug!(marker = %self.path.display(), status = %status, "Status marker written");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(staging_file_name(&name))
    }

    /// Create the marker as incomplete if it is missing
    ///
    /// Returns `true` when the file had to be created.
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }
        self.write(CollectionStatus::Incomplete)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_tokens() {
        assert_eq!("OK".parse::<CollectionStatus>().unwrap(), CollectionStatus::Complete);
        assert_eq!("  OK\n".parse::<CollectionStatus>().unwrap(), CollectionStatus::Complete);
        assert_eq!(
            "NOT-OK".parse::<CollectionStatus>().unwrap(),
            CollectionStatus::Incomplete
        );
        assert_eq!("NOK".parse::<CollectionStatus>().unwrap(), CollectionStatus::Incomplete);
    }

    #[test]
    fn test_parse_rejects_unknown_content() {
        for content in ["", "ok", "DONE", "OK OK", "NOT OK"] {
            let err = content.parse::<CollectionStatus>().unwrap_err();
            assert!(err.is_configuration_error(), "should reject {:?}", content);
        }
    }

    #[test]
    fn test_display_matches_token() {
        assert_eq!(CollectionStatus::Complete.to_string(), "OK");
        assert_eq!(CollectionStatus::Incomplete.to_string(), "NOT-OK");
        assert!(CollectionStatus::Complete.is_complete());
        assert!(!CollectionStatus::Incomplete.is_complete());
    }

    #[test]
    fn test_marker_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let marker = StatusMarker::new(temp_dir.path(), "status.txt");

        assert!(!marker.exists());
        assert_eq!(marker.read().unwrap(), None);

        assert!(marker.ensure_exists().unwrap());
        assert_eq!(marker.read().unwrap(), Some(CollectionStatus::Incomplete));
        assert!(!marker.ensure_exists().unwrap());

        marker.write(CollectionStatus::Complete).unwrap();
        assert_eq!(std::fs::read_to_string(marker.path()).unwrap(), "OK");
        assert_eq!(marker.read().unwrap(), Some(CollectionStatus::Complete));

        // ensure_exists never downgrades an existing marker
        assert!(!marker.ensure_exists().unwrap());
        assert_eq!(marker.read().unwrap(), Some(CollectionStatus::Complete));
    }

    #[test]
    fn test_marker_rewrites_leave_only_whole_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let marker = StatusMarker::new(temp_dir.path(), "status.txt");
        marker.write(CollectionStatus::Complete).unwrap();

        // A staging file left by an interrupted write must not affect the marker
        std::fs::write(temp_dir.path().join(".status.txt.tmp"), "").unwrap();
        assert_eq!(marker.read().unwrap(), Some(CollectionStatus::Complete));

        for status in [
            CollectionStatus::Incomplete,
            CollectionStatus::Complete,
            CollectionStatus::Incomplete,
        ] {
            marker.write(status).unwrap();
            let content = std::fs::read_to_string(marker.path()).unwrap();
            assert!(content == "OK" || content == "NOT-OK", "torn marker {:?}", content);
            assert_eq!(marker.read().unwrap(), Some(status));
        }

        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["status.txt"]);
    }

    #[test]
    fn test_marker_write_failure_keeps_previous_token() {
        let temp_dir = TempDir::new().unwrap();
        let marker = StatusMarker::new(temp_dir.path(), "status.txt");
        marker.write(CollectionStatus::Complete).unwrap();

        // Staging path occupied by a directory makes the write fail before the rename
        std::fs::create_dir(temp_dir.path().join(".status.txt.tmp")).unwrap();
        assert!(marker.write(CollectionStatus::Incomplete).is_err());
        assert_eq!(std::fs::read_to_string(marker.path()).unwrap(), "OK");
    }

    #[test]
    fn test_marker_read_reports_path_on_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let marker = StatusMarker::new(temp_dir.path(), "status.txt");
        std::fs::write(marker.path(), "maybe").unwrap();

        let err = marker.read().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("maybe"));
        assert!(err.to_string().contains("status.txt"));
    }
}
