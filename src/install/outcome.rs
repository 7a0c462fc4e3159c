// src/install/outcome.rs

//! Results of an install attempt

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Terminal state of one install attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InstallOutcome {
    /// Build and install succeeded; `file_count` paths were tracked
    Success { file_count: usize },
    /// Build succeeded and the build system has no install step
    NoInstallStep,
    /// A build command exited non-zero
    BuildFailed {
        command: String,
        /// Hint about a missing dependency, if one was recognized
        dependency: Option<String>,
    },
    /// The install command exited non-zero
    InstallFailed { command: String },
    /// A command's executable could not be found or launched
    CommandNotFound { command: String },
    /// No known build system in the source tree
    DetectionFailed,
    /// Installed into staging, but recording the manifest failed; the
    /// staging root is kept so recording can be retried
    Untracked {
        file_count: usize,
        staging_root: PathBuf,
        reason: String,
    },
    /// The attempt was cancelled
    Cancelled,
}

impl InstallOutcome {
    /// Whether the build (and install, if any) completed
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            InstallOutcome::Success { .. } | InstallOutcome::NoInstallStep
        )
    }

    /// Collaborator-facing form of this outcome
    pub fn to_result(&self) -> InstallResult {
        InstallResult::from(self)
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Success { file_count } => {
                write!(f, "Installed {} files", file_count)
            }
            InstallOutcome::NoInstallStep => f.write_str("Build successful (no install step)"),
            InstallOutcome::BuildFailed {
                command,
                dependency: Some(dependency),
            } => write!(f, "Command failed: {} (missing dependency? {})", command, dependency),
            InstallOutcome::BuildFailed {
                command,
                dependency: None,
            } => write!(f, "Command failed: {}", command),
            InstallOutcome::InstallFailed { command } => {
                write!(f, "Installation command failed: {}", command)
            }
            InstallOutcome::CommandNotFound { command } => {
                write!(f, "Command not found: {}", command)
            }
            InstallOutcome::DetectionFailed => f.write_str("Build system not detected"),
            InstallOutcome::Untracked {
                file_count,
                staging_root,
                reason,
            } => write!(
                f,
                "Installed {} files but could not record them ({}); staging kept at {}",
                file_count,
                reason,
                staging_root.display()
            ),
            InstallOutcome::Cancelled => f.write_str("Installation cancelled"),
        }
    }
}

/// What a presentation layer acts on
///
/// `DependencyIssue` carries a package name hint the front end may offer
/// to install; remediation is entirely up to the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum InstallResult {
    Success(String),
    DependencyIssue(String),
    Failure(String),
}

impl From<&InstallOutcome> for InstallResult {
    fn from(outcome: &InstallOutcome) -> Self {
        match outcome {
            InstallOutcome::Success { .. } | InstallOutcome::NoInstallStep => {
                InstallResult::Success(outcome.to_string())
            }
            InstallOutcome::BuildFailed {
                dependency: Some(dependency),
                ..
            } => InstallResult::DependencyIssue(dependency.clone()),
            _ => InstallResult::Failure(outcome.to_string()),
        }
    }
}
