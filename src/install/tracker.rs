// src/install/tracker.rs

//! Installed-file manifests from a staging root

use crate::error::{Error, Result};
use std::path::Path;
use walkdir::WalkDir;

/// Every non-directory entry under `staging_root`, as an absolute path
/// relative to the staging root (`<staging>/usr/bin/x` becomes
/// `/usr/bin/x`)
///
/// Symlinks are recorded and never followed. The result is sorted and has
/// no duplicates.
pub fn manifest(staging_root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(staging_root).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(staging_root).map_err(|_| {
            Error::InvalidPath(format!(
                "{} is outside {}",
                entry.path().display(),
                staging_root.display()
            ))
        })?;
        files.push(format!("/{}", relative.to_string_lossy()));
    }

    files.sort();
    Ok(files)
}
