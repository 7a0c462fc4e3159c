// src/error.rs

//! Error types for srctrack
//!
//! Failures of a well-formed install attempt (no build system, a command
//! that exits non-zero, a missing tool) are not errors; they are
//! [`InstallOutcome`](crate::install::InstallOutcome) variants. This enum
//! covers the cases where the pipeline itself could not do its job.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the archive reader, the package store and the
/// install pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Unreadable, corrupt or unsupported archive, or an I/O failure while
    /// extracting it
    #[error("Archive error for '{}': {reason}", path.display())]
    Archive { path: PathBuf, reason: String },

    /// Persistence transaction failure
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A path that violates the manifest invariants
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error outside archive handling
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while walking a staging root
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The install worker thread panicked
    #[error("Install worker panicked")]
    WorkerPanicked,
}

impl Error {
    /// Build an archive error for `path`
    pub fn archive(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Error::Archive {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
