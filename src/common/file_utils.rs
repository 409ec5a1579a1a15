use crate::common::timestamp_utils;
use crate::errors::AppError;
use log::debug;
use std::path::{Path, PathBuf};

/// Filename marker for an image that has not been uploaded yet.
pub const PENDING_MARKER: &str = "_0";
/// Filename marker for an image the warehouse has confirmed.
pub const UPLOADED_MARKER: &str = "_1";

pub fn generate_pending_filename(
    camera_name: &str,      // e.g. "east"
    timestamp_format: &str, // from config, e.g. "%Y%m%d_%H%M%S"
    extension: &str,        // e.g. "jpg"
) -> String {
    let timestamp = timestamp_utils::current_local_timestamp_str(timestamp_format);
    format!("{}_{}{}.{}", camera_name, timestamp, PENDING_MARKER, extension)
}

/// True when the file stem ends with the pending marker. Only a trailing
/// marker immediately before the extension counts, so a camera name that
/// happens to contain "_0" cannot be misclassified.
pub fn is_pending(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.ends_with(PENDING_MARKER))
        .unwrap_or(false)
}

pub fn is_uploaded(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.ends_with(UPLOADED_MARKER))
        .unwrap_or(false)
}

/// Path the file will have once its pending marker is flipped to uploaded.
/// Returns None for paths without the pending marker.
pub fn uploaded_path(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let base = stem.strip_suffix(PENDING_MARKER)?;
    let ext = path.extension()?.to_str()?;
    Some(path.with_file_name(format!("{}{}.{}", base, UPLOADED_MARKER, ext)))
}

/// Rename a pending file to its uploaded name. The rename is the commit
/// point of the upload; a file is never retried after this succeeds.
pub fn mark_uploaded(path: &Path) -> Result<PathBuf, AppError> {
    let target = uploaded_path(path).ok_or_else(|| {
        AppError::Io(format!(
            "File '{}' does not carry the pending marker, refusing to rename.",
            path.display()
        ))
    })?;
    std::fs::rename(path, &target).map_err(|e| {
        AppError::Io(format!(
            "Failed to rename '{}' to '{}': {}",
            path.display(),
            target.display(),
            e
        ))
    })?;
    debug!("Renamed '{}' -> '{}'", path.display(), target.display());
    Ok(target)
}

pub fn ensure_output_directory(dir_path_str: &str) -> Result<PathBuf, AppError> {
    let dir_path = PathBuf::from(dir_path_str);
    if !dir_path.exists() {
        debug!(
            "Output directory '{}' does not exist, attempting to create it.",
            dir_path.display()
        );
        std::fs::create_dir_all(&dir_path).map_err(|e| {
            AppError::Io(format!(
                "Failed to create output directory '{}': {}",
                dir_path.display(),
                e
            ))
        })?;
    } else if !dir_path.is_dir() {
        return Err(AppError::Io(format!(
            "Output path '{}' exists but is not a directory.",
            dir_path.display()
        )));
    }
    Ok(dir_path)
}

/// All pending image files in a camera's directory, in no particular order.
pub fn scan_pending_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut pending = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AppError::Io(format!("Failed to read directory '{}': {}", dir.display(), e))
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| {
            AppError::Io(format!(
                "Failed to read directory entry in '{}': {}",
                dir.display(),
                e
            ))
        })?;
        let path = entry.path();
        if path.is_file() && is_pending(&path) {
            pending.push(path);
        }
    }
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn pending_filename_carries_marker_and_extension() {
        let name = generate_pending_filename("east", "%Y%m%d", "jpg");
        assert!(name.starts_with("east_"));
        assert!(name.ends_with("_0.jpg"));
    }

    #[test]
    fn marker_detection_is_strict() {
        assert!(is_pending(Path::new("img/east/east_20240101_120000_0.jpg")));
        assert!(!is_pending(Path::new("img/east/east_20240101_120000_1.jpg")));
        // "_0" inside the name does not count, only a trailing marker does
        assert!(!is_pending(Path::new("img/cam_0/cam_01_20240101_120000_1.jpg")));
        assert!(is_pending(Path::new("img/cam_0/cam_0_20240101_120000_0.jpg")));
        assert!(!is_pending(Path::new("img/east/notes.txt")));
    }

    #[test]
    fn uploaded_path_flips_trailing_marker_only() {
        let path = Path::new("img/east/east_20240101_120000_0.jpg");
        let renamed = uploaded_path(path).unwrap();
        assert_eq!(
            renamed,
            PathBuf::from("img/east/east_20240101_120000_1.jpg")
        );
        assert!(uploaded_path(Path::new("img/east/east_20240101_120000_1.jpg")).is_none());
    }

    #[test]
    fn mark_uploaded_renames_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let pending = tmp.path().join("east_20240101_120000_0.jpg");
        File::create(&pending).unwrap();

        let uploaded = mark_uploaded(&pending).unwrap();
        assert!(!pending.exists());
        assert!(uploaded.exists());
        assert!(uploaded.to_str().unwrap().ends_with("east_20240101_120000_1.jpg"));
    }

    #[test]
    fn mark_uploaded_refuses_non_pending_file() {
        let tmp = tempfile::tempdir().unwrap();
        let uploaded = tmp.path().join("east_20240101_120000_1.jpg");
        File::create(&uploaded).unwrap();
        assert!(mark_uploaded(&uploaded).is_err());
        assert!(uploaded.exists());
    }

    #[test]
    fn scan_skips_uploaded_and_foreign_files() {
        let tmp = tempfile::tempdir().unwrap();
        File::create(tmp.path().join("east_20240101_120000_0.jpg")).unwrap();
        File::create(tmp.path().join("east_20240101_110000_1.jpg")).unwrap();
        File::create(tmp.path().join("README.txt")).unwrap();
        std::fs::create_dir(tmp.path().join("subdir_0")).unwrap();

        let pending = scan_pending_files(tmp.path()).unwrap();
        assert_eq!(pending.len(), 1);
        assert!(is_pending(&pending[0]));
    }
}
