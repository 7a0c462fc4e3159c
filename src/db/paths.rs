// src/db/paths.rs
//! Centralized path derivation for the package database

use std::path::{Path, PathBuf};

/// Environment variable overriding the database location
pub const DB_ENV: &str = "SRCTRACK_DB";

/// File name of the package database
pub const DB_FILE_NAME: &str = "library.db";

/// Default database path
///
/// `$SRCTRACK_DB` if set, otherwise `library.db` under the user's local
/// data directory (`~/.local/share/srctrack` on Linux).
pub fn default_db_path() -> PathBuf {
    std::env::var_os(DB_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_db_path(dirs::data_local_dir()))
}

fn data_db_path(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir
        .unwrap_or_else(|| PathBuf::from("/var/lib"))
        .join("srctrack")
        .join(DB_FILE_NAME)
}

/// Get the directory containing the database
pub fn db_dir(db_path: &Path) -> PathBuf {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_dir() {
        assert_eq!(
            db_dir(Path::new("/var/lib/srctrack/library.db")),
            PathBuf::from("/var/lib/srctrack")
        );
        assert_eq!(db_dir(Path::new("library.db")), PathBuf::from("."));
    }

    #[test]
    fn test_data_db_path() {
        assert_eq!(
            data_db_path(Some(PathBuf::from("/home/user/.local/share"))),
            PathBuf::from("/home/user/.local/share/srctrack/library.db")
        );
        assert_eq!(
            data_db_path(None),
            PathBuf::from("/var/lib/srctrack/library.db")
        );
    }
}
