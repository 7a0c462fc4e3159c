// src/db/models/mod.rs

//! Data models for the package store
//!
//! Rows are immutable once written; models only insert and read.

mod installed_file;
mod package;

pub use installed_file::InstalledFile;
pub use package::Package;
