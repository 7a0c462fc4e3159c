// src/lib.rs

//! srctrack: build and install source tarballs, tracking what they install
//!
//! A `.tar.gz` source archive is extracted into a temporary tree, its build
//! system is detected, and the build commands run with their output
//! streamed to a [`LogSink`]. The install command runs with `DESTDIR`
//! pointing at a staging root; every file that lands there is recorded in a
//! SQLite package store.
//!
//! # Architecture
//!
//! - Archive reader: list, extract and read members of gzip-tar archives
//! - Build system detection: autotools, CMake, setuptools, plain make
//! - Install pipeline: streamed, cancellable command execution with
//!   DESTDIR staging
//! - Package store: packages and their file manifests, written atomically
//! - Diagnostics: missing header and library hints from failed builds

pub mod archive;
pub mod buildsys;
pub mod db;
pub mod diagnose;
mod error;
pub mod install;
pub mod sink;

pub use buildsys::{BuildSystem, CommandRole, CommandSpec};
pub use db::{PackageStore, SharedStore};
pub use diagnose::MissingDependency;
pub use error::{Error, Result};
pub use install::{
    CancelToken, InstallHandle, InstallOutcome, InstallResult, Installer, InstallerConfig,
    PackageIdent,
};
pub use sink::{ChannelSink, LogSink, MemorySink, NullSink, TracingSink};
