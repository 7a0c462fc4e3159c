// src/install/mod.rs

//! Install pipeline: extract, detect, build, stage, track
//!
//! [`Installer`] drives one attempt end to end. Every temporary directory
//! it creates is a [`tempfile::TempDir`] guard, so the extracted tree and
//! the staging root are removed on every exit path. The one exception is
//! [`InstallOutcome::Untracked`], where the staging root is deliberately
//! kept.

mod cancel;
mod config;
mod executor;
mod naming;
mod outcome;
mod process;
pub mod tracker;

pub use cancel::CancelToken;
pub use config::{InstallerConfig, WORK_DIR_ENV};
pub use executor::{Executor, STAGING_PREFIX};
pub use naming::{PackageIdent, package_name, package_version};
pub use outcome::{InstallOutcome, InstallResult};

use crate::archive;
use crate::buildsys;
use crate::db::SharedStore;
use crate::error::{Error, Result};
use crate::sink::LogSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Runs install attempts against an optional package store
#[derive(Debug, Clone, Default)]
pub struct Installer {
    config: InstallerConfig,
    store: Option<SharedStore>,
}

impl Installer {
    pub fn new(config: InstallerConfig) -> Self {
        Self {
            config,
            store: None,
        }
    }

    /// Record successful installs in `store`
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Install `archive`, streaming command output to `sink`
    pub fn install(&self, archive: &Path, sink: &dyn LogSink) -> Result<InstallOutcome> {
        self.install_with_cancel(archive, sink, &CancelToken::new())
    }

    /// Install `archive`, stopping early once `cancel` fires
    ///
    /// Errors are reserved for failures of the pipeline itself (unreadable
    /// archive, I/O); a build that fails is an `Ok` outcome.
    pub fn install_with_cancel(
        &self,
        archive: &Path,
        sink: &dyn LogSink,
        cancel: &CancelToken,
    ) -> Result<InstallOutcome> {
        check_archive_name(archive)?;

        sink.line(&format!("Extracting {}...", archive.display()));
        let extracted = match archive::extract_in(archive, &self.config.work_dir) {
            Ok(extracted) => extracted,
            Err(e) => {
                sink.line(&format!("Error extracting archive: {}", e));
                return Err(e);
            }
        };
        sink.line(&format!(
            "Extraction successful to: {}",
            extracted.root().display()
        ));

        if cancel.is_cancelled() {
            return Ok(InstallOutcome::Cancelled);
        }

        let build_system = buildsys::detect(extracted.root());
        let ident = PackageIdent::from_archive_path(archive);

        let mut executor = Executor::new(extracted.root(), &self.config, sink, cancel);
        if let Some(store) = &self.store {
            executor = executor.with_store(store);
        }
        let outcome = executor.run(build_system, &ident)?;

        drop(extracted);
        sink.line("Cleaned up temporary directory.");

        if outcome.is_success() {
            info!("Installed {}: {}", ident, outcome);
        } else {
            warn!("Install of {} did not complete: {}", ident, outcome);
        }
        Ok(outcome)
    }

    /// Run an install attempt on a worker thread
    pub fn spawn(
        &self,
        archive: impl Into<PathBuf>,
        sink: Arc<dyn LogSink>,
    ) -> Result<InstallHandle> {
        let archive = archive.into();
        let installer = self.clone();
        let cancel = CancelToken::new();
        let token = cancel.clone();

        let thread = thread::Builder::new()
            .name("srctrack-install".to_string())
            .spawn(move || installer.install_with_cancel(&archive, sink.as_ref(), &token))?;

        Ok(InstallHandle { cancel, thread })
    }
}

/// A running install started by [`Installer::spawn`]
pub struct InstallHandle {
    cancel: CancelToken,
    thread: JoinHandle<Result<InstallOutcome>>,
}

impl InstallHandle {
    /// Ask the attempt to stop; the running command's process group is
    /// killed
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the attempt to finish
    pub fn join(self) -> Result<InstallOutcome> {
        self.thread.join().map_err(|_| Error::WorkerPanicked)?
    }
}

fn check_archive_name(archive: &Path) -> Result<()> {
    let supported = archive
        .file_name()
        .map(|name| name.to_string_lossy().ends_with(ARCHIVE_SUFFIX))
        .unwrap_or(false);

    if supported {
        Ok(())
    } else {
        Err(Error::archive(
            archive,
            "unsupported archive type, only .tar.gz is supported",
        ))
    }
}
