// src/commands/install.rs

//! Init and install commands

use anyhow::{Context, Result};
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use serde::Serialize;
use srctrack::{
    InstallHandle, InstallOutcome, InstallResult, Installer, InstallerConfig, LogSink,
    PackageStore,
};
use std::ffi::c_int;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Set from the SIGINT/SIGTERM handler while an install is running
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Routes SIGINT and SIGTERM to [`INTERRUPTED`] until dropped
///
/// Build commands run in their own process group, so a terminal Ctrl-C
/// only reaches srctrack; the install must be cancelled from here for the
/// commands and temporary directories to be cleaned up.
struct InterruptGuard {
    previous: Vec<(Signal, SigAction)>,
}

impl InterruptGuard {
    fn install() -> Result<Self> {
        INTERRUPTED.store(false, Ordering::SeqCst);
        let action = SigAction::new(
            SigHandler::Handler(on_interrupt),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );

        let mut guard = Self {
            previous: Vec::new(),
        };
        for signal in [Signal::SIGINT, Signal::SIGTERM] {
            // SAFETY: the handler only stores to an atomic
            let previous = unsafe { sigaction(signal, &action) }
                .with_context(|| format!("Failed to install {} handler", signal.as_str()))?;
            guard.previous.push((signal, previous));
        }
        Ok(guard)
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        for (signal, previous) in &self.previous {
            // SAFETY: restores the action that was in place before install()
            if let Err(e) = unsafe { sigaction(*signal, previous) } {
                warn!("Failed to restore {} handler: {}", signal.as_str(), e);
            }
        }
    }
}

/// Wait for a spawned install, cancelling it once `interrupted` is set
fn wait_for_install(
    handle: InstallHandle,
    interrupted: &AtomicBool,
    poll: Duration,
) -> srctrack::Result<InstallOutcome> {
    let mut cancelled = false;
    while !handle.is_finished() {
        if !cancelled && interrupted.load(Ordering::SeqCst) {
            warn!("Interrupted, stopping the install");
            handle.cancel();
            cancelled = true;
        }
        thread::sleep(poll);
    }
    handle.join()
}

/// Create the package database
pub fn cmd_init(db_path: &Path) -> Result<()> {
    info!("Initializing database at: {}", db_path.display());
    srctrack::db::init(db_path)
        .with_context(|| format!("Failed to initialize database: {}", db_path.display()))?;
    println!("Database initialized successfully at: {}", db_path.display());
    Ok(())
}

#[derive(Serialize)]
struct InstallReport<'a> {
    archive: &'a Path,
    outcome: &'a InstallOutcome,
    result: InstallResult,
}

/// Build and install a source archive
///
/// Returns whether the install succeeded. With `json`, command output goes
/// to stderr and only the report is printed on stdout.
pub fn cmd_install(
    archive: &Path,
    db_path: &Path,
    work_dir: Option<PathBuf>,
    no_track: bool,
    json: bool,
) -> Result<bool> {
    let mut config = InstallerConfig::from_env();
    if let Some(dir) = work_dir {
        config = config.with_work_dir(dir);
    }
    if no_track {
        config = config.without_tracking();
    }

    let mut installer = Installer::new(config);
    if !no_track {
        let store = PackageStore::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        installer = installer.with_store(store.into_shared());
    }

    let sink: Arc<dyn LogSink> = if json {
        Arc::new(|line: &str| eprintln!("{}", line))
    } else {
        Arc::new(|line: &str| println!("{}", line))
    };

    let poll = installer.config().poll_interval;
    let guard = InterruptGuard::install()?;
    let handle = installer
        .spawn(archive, sink)
        .with_context(|| format!("Failed to start install of {}", archive.display()))?;
    let outcome = wait_for_install(handle, &INTERRUPTED, poll);
    drop(guard);

    let outcome = outcome.with_context(|| format!("Failed to install {}", archive.display()))?;

    let result = outcome.to_result();
    if json {
        let report = InstallReport {
            archive,
            outcome: &outcome,
            result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        match &result {
            InstallResult::Success(message) => println!("[OK] {}", message),
            InstallResult::DependencyIssue(hint) => {
                println!("[FAILED] Build failed, possibly missing a dependency.");
                println!("  Try installing: {}", hint);
            }
            InstallResult::Failure(reason) => println!("[FAILED] {}", reason),
        }
    }

    Ok(outcome.is_success())
}
