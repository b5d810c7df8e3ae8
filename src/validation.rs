//! Validation pass: decode every downloaded file and delete the ones that
//! are not images.

use crate::error::{CollectorError, Result};
use crate::status::staging_file_name;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one validation pass over a class directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Files that were decoded
    pub checked: usize,
    /// Files that decoded successfully and were kept
    pub kept: usize,
    /// Files removed because they failed to decode
    pub deleted: Vec<PathBuf>,
}

impl ValidationReport {
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

/// Decodes files with the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageValidator;

impl ImageValidator {
    /// Attempt to decode a file as an image
    ///
    /// The format is guessed from the content, so a PNG saved as `.jpg`
    /// still counts as valid.
    ///
    /// # Errors
    /// - `Decode` when the content is not a decodable image
    /// - `Io` when the file cannot be opened
    pub fn check<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let reader = image::ImageReader::open(path)
            .map_err(|e| CollectorError::file_io_error("open image", path, &e))?
            .with_guessed_format()
            .map_err(|e| CollectorError::file_io_error("read image header", path, &e))?;

        if reader.format().is_none() {
            return Err(CollectorError::decode(format!(
                "Unrecognized image format: '{}'",
                path.display()
            )));
        }

        reader
            .decode()
            .map(|_| ())
            .map_err(|e| CollectorError::image_decode_error(path, &e))
    }

    /// Decode every regular file in `class_dir` except the marker, deleting
    /// the ones that fail
    ///
    /// Subdirectories are left alone. Running the pass twice deletes
    /// nothing the second time.
    pub fn prune<P: AsRef<Path>>(class_dir: P, marker_name: &str) -> Result<ValidationReport> {
        let class_dir = class_dir.as_ref();
        let mut report = ValidationReport::default();

        for path in list_image_files(class_dir, marker_name)? {
            report.checked += 1;
            match Self::check(&path) {
                Ok(()) => report.kept += 1,
                Err(CollectorError::Decode(reason)) => {
                    tracing::info!(path = %path.display(), "deleting {}", path.display());
                    tracing::debug!(reason = %reason, "Image failed to decode");
                    fs::remove_file(&path)
                        .map_err(|e| CollectorError::file_io_error("delete corrupted image", &path, &e))?;
                    report.deleted.push(path);
                },
                Err(other) => return Err(other),
            }
        }

        Ok(report)
    }
}

/// Files in `class_dir` other than the marker and its staging file, sorted
/// by name
///
/// Symlinks to files are included; the link itself is what gets deleted.
pub fn list_image_files(class_dir: &Path, marker_name: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(class_dir)
        .map_err(|e| CollectorError::file_io_error("list class directory", class_dir, &e))?;

    let staging_name = staging_file_name(marker_name);
    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| CollectorError::file_io_error("list class directory", class_dir, &e))?;
        let name = entry.file_name();
        if name == marker_name || name == staging_name.as_str() {
            continue;
        }

        // Follows symlinks, so a link to a file is treated like the file
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_png(path: &Path) {
        let img = RgbImage::from_pixel(4, 4, Rgb([200, 10, 10]));
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }

    fn write_jpeg(path: &Path) {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 200, 10]));
        img.save_with_format(path, ImageFormat::Jpeg).unwrap();
    }

    #[test]
    fn test_check_accepts_valid_images_regardless_of_extension() {
        let temp_dir = TempDir::new().unwrap();
        let jpeg = temp_dir.path().join("00000000.jpg");
        let png_named_jpg = temp_dir.path().join("00000001.jpg");
        write_jpeg(&jpeg);
        write_png(&png_named_jpg);

        assert!(ImageValidator::check(&jpeg).is_ok());
        assert!(ImageValidator::check(&png_named_jpg).is_ok());
    }

    #[test]
    fn test_check_rejects_garbage_and_truncated_files() {
        let temp_dir = TempDir::new().unwrap();

        let html = temp_dir.path().join("00000000.jpg");
        fs::write(&html, b"<html><body>404 Not Found</body></html>").unwrap();
        assert!(matches!(
            ImageValidator::check(&html),
            Err(CollectorError::Decode(_))
        ));

        let empty = temp_dir.path().join("00000001.jpg");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(
            ImageValidator::check(&empty),
            Err(CollectorError::Decode(_))
        ));

        let full = temp_dir.path().join("full.png");
        write_png(&full);
        let bytes = fs::read(&full).unwrap();
        let truncated = temp_dir.path().join("00000002.jpg");
        fs::write(&truncated, &bytes[..bytes.len() / 2]).unwrap();
        assert!(matches!(
            ImageValidator::check(&truncated),
            Err(CollectorError::Decode(_))
        ));
    }

    #[test]
    fn test_check_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = ImageValidator::check(temp_dir.path().join("absent.jpg"));
        assert!(matches!(result, Err(CollectorError::Io(_))));
    }

    #[test]
    fn test_prune_removes_only_undecodable_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_jpeg(&dir.join("00000000.jpg"));
        write_png(&dir.join("00000001.jpg"));
        fs::write(dir.join("00000002.jpg"), b"not an image").unwrap();
        fs::write(dir.join("00000003.jpg"), b"\xff\xd8\xff garbage").unwrap();
        fs::write(dir.join("status.txt"), "OK").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();

        let report = ImageValidator::prune(dir, "status.txt").unwrap();
        assert_eq!(report.checked, 4);
        assert_eq!(report.kept, 2);
        assert_eq!(report.deleted_count(), 2);
        assert!(dir.join("00000000.jpg").exists());
        assert!(dir.join("00000001.jpg").exists());
        assert!(!dir.join("00000002.jpg").exists());
        assert!(!dir.join("00000003.jpg").exists());
        assert!(dir.join("status.txt").exists());
        assert!(dir.join("nested").is_dir());

        let second = ImageValidator::prune(dir, "status.txt").unwrap();
        assert_eq!(second.checked, 2);
        assert_eq!(second.deleted_count(), 0);
    }

    #[test]
    fn test_list_image_files_skips_marker_staging_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("status.txt"), "OK").unwrap();
        fs::write(dir.join(".status.txt.tmp"), "NOT-OK").unwrap();
        fs::write(dir.join("00000000.jpg"), b"x").unwrap();

        let files = list_image_files(dir, "status.txt").unwrap();
        assert_eq!(files, vec![dir.join("00000000.jpg")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_prune_follows_symlinked_files() {
        let temp_dir = TempDir::new().unwrap();
        let outside = temp_dir.path().join("outside");
        let dir = temp_dir.path().join("jeans");
        fs::create_dir(&outside).unwrap();
        fs::create_dir(&dir).unwrap();

        write_png(&outside.join("real.png"));
        fs::write(outside.join("junk.bin"), b"not an image").unwrap();
        std::os::unix::fs::symlink(outside.join("real.png"), dir.join("00000000.jpg")).unwrap();
        std::os::unix::fs::symlink(outside.join("junk.bin"), dir.join("00000001.jpg")).unwrap();

        let report = ImageValidator::prune(&dir, "status.txt").unwrap();
        assert_eq!(report.checked, 2);
        assert_eq!(report.kept, 1);
        assert_eq!(report.deleted, vec![dir.join("00000001.jpg")]);
        assert!(fs::symlink_metadata(dir.join("00000001.jpg")).is_err());
        // Only the link is removed, never its target
        assert!(outside.join("junk.bin").exists());
    }

    #[test]
    fn test_list_image_files_is_sorted_and_skips_marker() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["00000002.jpg", "00000000.jpg", "status.txt", "00000001.jpg"] {
            fs::write(dir.join(name), b"x").unwrap();
        }

        let files = list_image_files(dir, "status.txt").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["00000000.jpg", "00000001.jpg", "00000002.jpg"]);
    }
}
