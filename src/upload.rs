//! Builds the ordered file list for one upload batch.
//!
//! Files are taken as given. Directories are walked recursively and
//! contribute their `.pdf` files in sorted order, so a batch always
//! extracts in the same order.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no such file or directory: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to scan {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Expand user-supplied paths into the batch's PDF paths, preserving input order.
pub fn collect_pdf_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, UploadError> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_file() {
            paths.push(input.clone());
        } else if input.is_dir() {
            paths.extend(scan_dir(input)?);
        } else {
            return Err(UploadError::Missing(input.clone()));
        }
    }

    Ok(paths)
}

fn scan_dir(root: &Path) -> Result<Vec<PathBuf>, UploadError> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| UploadError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_pdf(entry.path()) {
            found.push(entry.into_path());
        }
    }

    // Sort for deterministic ordering
    found.sort();
    Ok(found)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
