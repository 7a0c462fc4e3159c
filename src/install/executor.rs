// src/install/executor.rs

//! Build, stage and record one extracted source tree
//!
//! Build-role commands run in order in the source root. The install
//! command runs last with `DESTDIR` pointing at a fresh staging root, which
//! is only created once every build command has succeeded. The staging
//! root is walked into a manifest and recorded in the package store.

use crate::buildsys::{BuildSystem, CommandRole, CommandSpec};
use crate::db::SharedStore;
use crate::diagnose;
use crate::error::Result;
use crate::install::process::{CommandStatus, run_streamed};
use crate::install::{CancelToken, InstallOutcome, InstallerConfig, PackageIdent, tracker};
use crate::sink::LogSink;
use std::path::Path;
use std::sync::PoisonError;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Prefix of staging directories created under the work dir
pub const STAGING_PREFIX: &str = "srctrack-staging-";

/// Runs the command sequence for one source root
pub struct Executor<'a> {
    root: &'a Path,
    config: &'a InstallerConfig,
    sink: &'a dyn LogSink,
    cancel: &'a CancelToken,
    store: Option<&'a SharedStore>,
}

impl<'a> Executor<'a> {
    pub fn new(
        root: &'a Path,
        config: &'a InstallerConfig,
        sink: &'a dyn LogSink,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            root,
            config,
            sink,
            cancel,
            store: None,
        }
    }

    /// Record successful installs in `store`
    pub fn with_store(mut self, store: &'a SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Run the command table for `build_system`, recording the result as
    /// `ident`
    pub fn run(
        &self,
        build_system: Option<BuildSystem>,
        ident: &PackageIdent,
    ) -> Result<InstallOutcome> {
        let Some(build_system) = build_system else {
            self.sink.line("Could not detect a known build system.");
            return Ok(InstallOutcome::DetectionFailed);
        };
        self.sink
            .line(&format!("Detected build system: {}", build_system));

        self.run_commands(&build_system.commands(), ident)
    }

    /// Run a command table: every build-role command in order, then the
    /// first install-role command against a fresh staging root
    fn run_commands(&self, commands: &[CommandSpec], ident: &PackageIdent) -> Result<InstallOutcome> {
        let (build, install): (Vec<&CommandSpec>, Vec<&CommandSpec>) = commands
            .iter()
            .partition(|command| command.role == CommandRole::Build);

        for command in &build {
            if let Some(outcome) = self.build_step(command)? {
                return Ok(outcome);
            }
        }
        if !build.is_empty() {
            self.sink.line("Build process completed successfully.");
        }

        match install.first().copied() {
            Some(command) => self.install_step(command, ident),
            None => {
                self.sink
                    .line("No installation command found. Skipping file tracking.");
                Ok(InstallOutcome::NoInstallStep)
            }
        }
    }

    /// Run one build command; `Some` is a terminal outcome
    fn build_step(&self, command: &CommandSpec) -> Result<Option<InstallOutcome>> {
        self.sink
            .line(&format!("--- Running build command: {} ---", command));
        let run = run_streamed(
            command,
            self.root,
            &[],
            self.sink,
            self.cancel,
            self.config.poll_interval,
        )?;

        let outcome = match run.status {
            CommandStatus::Succeeded => return Ok(None),
            CommandStatus::NotFound(reason) => self.not_found(command, &reason),
            CommandStatus::Cancelled => self.cancelled(command),
            CommandStatus::Failed(code) => {
                self.sink.line(&format!(
                    "Error executing command '{}' (exit code {})",
                    command,
                    exit_code(code)
                ));
                let dependency = diagnose::diagnose(&run.output);
                if let Some(hint) = &dependency {
                    self.sink
                        .line(&format!("Possible missing dependency: {}", hint));
                }
                InstallOutcome::BuildFailed {
                    command: command.to_string(),
                    dependency,
                }
            }
        };
        Ok(Some(outcome))
    }

    fn install_step(&self, command: &CommandSpec, ident: &PackageIdent) -> Result<InstallOutcome> {
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.config.work_dir)?;
        self.sink.line(&format!(
            "Created staging directory for installation tracking: {}",
            staging.path().display()
        ));
        self.sink.line(&format!(
            "--- Running install command: {} with DESTDIR={} ---",
            command,
            staging.path().display()
        ));

        let run = run_streamed(
            command,
            self.root,
            &[("DESTDIR", staging.path().as_os_str())],
            self.sink,
            self.cancel,
            self.config.poll_interval,
        )?;

        match run.status {
            CommandStatus::Succeeded => {}
            CommandStatus::NotFound(reason) => return Ok(self.not_found(command, &reason)),
            CommandStatus::Cancelled => return Ok(self.cancelled(command)),
            CommandStatus::Failed(code) => {
                self.sink.line(&format!(
                    "Installation command '{}' failed (exit code {})",
                    command,
                    exit_code(code)
                ));
                return Ok(InstallOutcome::InstallFailed {
                    command: command.to_string(),
                });
            }
        }

        let files = tracker::manifest(staging.path())?;
        self.sink
            .line(&format!("Tracked {} installed files:", files.len()));
        for file in &files {
            self.sink.line(&format!("  - {}", file));
        }

        self.record(staging, ident, files)
    }

    /// Persist the manifest, then release the staging root
    fn record(
        &self,
        staging: TempDir,
        ident: &PackageIdent,
        files: Vec<String>,
    ) -> Result<InstallOutcome> {
        let file_count = files.len();
        let store = match self.store {
            Some(store) if self.config.track && !files.is_empty() => store,
            _ => {
                debug!("Not recording {} ({} files)", ident, file_count);
                return Ok(InstallOutcome::Success { file_count });
            }
        };

        self.sink
            .line(&format!("Saving package '{}' to database.", ident));
        let saved = {
            let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
            store.add_package(&ident.name, &ident.version, &files)
        };

        match saved {
            Ok(package_id) => {
                info!("Recorded {} as package {} ({} files)", ident, package_id, file_count);
                self.sink.line("Package information saved successfully.");
                Ok(InstallOutcome::Success { file_count })
            }
            Err(e) => {
                let staging_root = staging.keep();
                warn!(
                    "Failed to record {}: {}; staging kept at {}",
                    ident,
                    e,
                    staging_root.display()
                );
                self.sink.line(&format!(
                    "Error saving package to database: {}. Installed files remain in {}",
                    e,
                    staging_root.display()
                ));
                Ok(InstallOutcome::Untracked {
                    file_count,
                    staging_root,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn not_found(&self, command: &CommandSpec, reason: &str) -> InstallOutcome {
        self.sink.line(&format!(
            "Error: command '{}' not found ({})",
            command.program(),
            reason
        ));
        InstallOutcome::CommandNotFound {
            command: command.to_string(),
        }
    }

    fn cancelled(&self, command: &CommandSpec) -> InstallOutcome {
        self.sink
            .line(&format!("Cancelled while running '{}'", command));
        InstallOutcome::Cancelled
    }
}

fn exit_code(code: Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::PackageStore;
    use crate::sink::{MemorySink, NullSink};
    use std::fs;
    use std::time::Duration;

    struct Fixture {
        work: tempfile::TempDir,
        source: tempfile::TempDir,
        config: InstallerConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let work = tempfile::tempdir().unwrap();
            let config = InstallerConfig::default()
                .with_work_dir(work.path())
                .with_poll_interval(Duration::from_millis(20));
            Self {
                work,
                source: tempfile::tempdir().unwrap(),
                config,
            }
        }

        fn staging_dirs(&self) -> usize {
            fs::read_dir(self.work.path())
                .unwrap()
                .filter(|e| {
                    e.as_ref()
                        .unwrap()
                        .file_name()
                        .to_string_lossy()
                        .starts_with(STAGING_PREFIX)
                })
                .count()
        }
    }

    fn have_make() -> bool {
        if which::which("make").is_ok() {
            true
        } else {
            eprintln!("make not available, skipping");
            false
        }
    }

    fn ident() -> PackageIdent {
        PackageIdent::from_file_name("app-1.0.tar.gz")
    }

    #[test]
    fn test_detection_failed_runs_nothing() {
        let fx = Fixture::new();
        let sink = MemorySink::new();
        let cancel = CancelToken::new();
        let outcome = Executor::new(fx.source.path(), &fx.config, &sink, &cancel)
            .run(None, &ident())
            .unwrap();

        assert_eq!(outcome, InstallOutcome::DetectionFailed);
        assert_eq!(fx.staging_dirs(), 0);
    }

    #[test]
    fn test_make_install_tracked() {
        if !have_make() {
            return;
        }
        let fx = Fixture::new();
        fs::write(
            fx.source.path().join("Makefile"),
            "all:\n\t@echo building\n\ninstall:\n\tmkdir -p $(DESTDIR)/usr/local/bin\n\techo app > $(DESTDIR)/usr/local/bin/app\n",
        )
        .unwrap();

        let store = PackageStore::open_in_memory().unwrap().into_shared();
        let sink = MemorySink::new();
        let cancel = CancelToken::new();
        let outcome = Executor::new(fx.source.path(), &fx.config, &sink, &cancel)
            .with_store(&store)
            .run(Some(BuildSystem::Make), &ident())
            .unwrap();

        assert_eq!(outcome, InstallOutcome::Success { file_count: 1 });
        assert!(sink.lines().iter().any(|l| l == "building"));
        assert_eq!(fx.staging_dirs(), 0);

        let store = store.lock().unwrap();
        let packages = store.find_by_name("app").unwrap();
        assert_eq!(packages.len(), 1);
        let files = store.files_for(packages[0].id.unwrap()).unwrap();
        assert!(files.contains("/usr/local/bin/app"));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_build_failure_skips_install_and_staging() {
        if !have_make() {
            return;
        }
        let fx = Fixture::new();
        fs::write(
            fx.source.path().join("Makefile"),
            "all:\n\t@echo 'main.c:1:10: fatal error: zlib.h: No such file or directory'\n\t@false\n\ninstall:\n\ttouch $(CURDIR)/installed\n",
        )
        .unwrap();

        let cancel = CancelToken::new();
        let outcome = Executor::new(fx.source.path(), &fx.config, &NullSink, &cancel)
            .run(Some(BuildSystem::Make), &ident())
            .unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::BuildFailed {
                command: "make".to_string(),
                dependency: Some("package containing zlib.h".to_string()),
            }
        );
        assert_eq!(fx.staging_dirs(), 0);
        assert!(!fx.source.path().join("installed").exists());
    }

    #[test]
    fn test_install_failure_removes_staging() {
        if !have_make() {
            return;
        }
        let fx = Fixture::new();
        fs::write(
            fx.source.path().join("Makefile"),
            "all:\n\t@true\n\ninstall:\n\t@exit 2\n",
        )
        .unwrap();

        let cancel = CancelToken::new();
        let outcome = Executor::new(fx.source.path(), &fx.config, &NullSink, &cancel)
            .run(Some(BuildSystem::Make), &ident())
            .unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::InstallFailed {
                command: "make install".to_string()
            }
        );
        assert_eq!(fx.staging_dirs(), 0);
    }

    #[test]
    fn test_missing_configure_is_command_not_found() {
        let fx = Fixture::new();
        let cancel = CancelToken::new();
        let outcome = Executor::new(fx.source.path(), &fx.config, &NullSink, &cancel)
            .run(Some(BuildSystem::Autotools), &ident())
            .unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::CommandNotFound {
                command: "./configure".to_string()
            }
        );
    }

    #[test]
    fn test_missing_install_program_removes_staging() {
        let fx = Fixture::new();
        let sink = MemorySink::new();
        let cancel = CancelToken::new();
        let commands = [
            CommandSpec::build(&["sh", "-c", "echo built"]),
            CommandSpec::install(&["srctrack-no-such-installer", "--prefix=/usr"]),
        ];

        let outcome = Executor::new(fx.source.path(), &fx.config, &sink, &cancel)
            .run_commands(&commands, &ident())
            .unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::CommandNotFound {
                command: "srctrack-no-such-installer --prefix=/usr".to_string()
            }
        );
        let lines = sink.lines();
        assert!(lines.iter().any(|l| l == "built"));
        assert!(lines.iter().any(|l| l.starts_with("Created staging directory")));
        assert_eq!(fx.staging_dirs(), 0);
    }

    #[test]
    fn test_table_without_install_step() {
        let fx = Fixture::new();
        let cancel = CancelToken::new();
        let commands = [CommandSpec::build(&["sh", "-c", "true"])];

        let outcome = Executor::new(fx.source.path(), &fx.config, &NullSink, &cancel)
            .run_commands(&commands, &ident())
            .unwrap();

        assert_eq!(outcome, InstallOutcome::NoInstallStep);
        assert_eq!(fx.staging_dirs(), 0);
    }

    #[test]
    fn test_empty_install_not_recorded() {
        if !have_make() {
            return;
        }
        let fx = Fixture::new();
        fs::write(
            fx.source.path().join("Makefile"),
            "all:\n\t@true\n\ninstall:\n\tmkdir -p $(DESTDIR)/usr/share/empty\n",
        )
        .unwrap();

        let store = PackageStore::open_in_memory().unwrap().into_shared();
        let cancel = CancelToken::new();
        let outcome = Executor::new(fx.source.path(), &fx.config, &NullSink, &cancel)
            .with_store(&store)
            .run(Some(BuildSystem::Make), &ident())
            .unwrap();

        assert_eq!(outcome, InstallOutcome::Success { file_count: 0 });
        assert!(store.lock().unwrap().list_packages().unwrap().is_empty());
    }

    #[test]
    fn test_store_failure_keeps_staging() {
        if !have_make() {
            return;
        }
        let fx = Fixture::new();
        fs::write(
            fx.source.path().join("Makefile"),
            "all:\n\t@true\n\ninstall:\n\tmkdir -p $(DESTDIR)/opt/app\n\ttouch $(DESTDIR)/opt/app/data\n",
        )
        .unwrap();

        let store = PackageStore::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch("DROP TABLE installed_files;")
            .unwrap();
        let store = store.into_shared();

        let cancel = CancelToken::new();
        let outcome = Executor::new(fx.source.path(), &fx.config, &NullSink, &cancel)
            .with_store(&store)
            .run(Some(BuildSystem::Make), &ident())
            .unwrap();

        match outcome {
            InstallOutcome::Untracked {
                file_count,
                staging_root,
                ..
            } => {
                assert_eq!(file_count, 1);
                assert!(staging_root.join("opt/app/data").exists());
                fs::remove_dir_all(staging_root).unwrap();
            }
            other => panic!("expected Untracked, got {:?}", other),
        }
        assert!(store.lock().unwrap().list_packages().unwrap().is_empty());
    }
}
