// src/diagnose.rs

//! Best-effort diagnosis of missing build dependencies
//!
//! Recognizes exactly two patterns in failed build output: a compiler
//! fatal error about a missing header, and a linker complaint about a
//! missing `-l` library. The result is a hint for a human, not a resolved
//! package name.

use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

static HEADER_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"fatal error: ([\w/.+-]+\.h):").unwrap());

static LIBRARY_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"cannot find -l(\w+)").unwrap());

/// A dependency the build output says is missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingDependency {
    /// Header path as written in the compiler error, e.g. `X11/Xlib.h`
    Header(String),
    /// Library name without the `lib` prefix, e.g. `ssl` for `-lssl`
    Library(String),
}

impl MissingDependency {
    /// Suggested package for the user to install
    pub fn package_hint(&self) -> String {
        match self {
            MissingDependency::Header(header) => format!("package containing {}", header),
            MissingDependency::Library(name) => format!("lib{}-dev", name),
        }
    }
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingDependency::Header(header) => write!(f, "missing header {}", header),
            MissingDependency::Library(name) => write!(f, "missing library lib{}", name),
        }
    }
}

/// Find the first recognizable missing dependency in build output
///
/// Header errors take precedence over linker errors.
pub fn detect_missing(output: &str) -> Option<MissingDependency> {
    if let Some(caps) = HEADER_RE.captures(output) {
        let missing = MissingDependency::Header(caps[1].to_string());
        debug!("Diagnosed {}", missing);
        return Some(missing);
    }

    if let Some(caps) = LIBRARY_RE.captures(output) {
        let missing = MissingDependency::Library(caps[1].to_string());
        debug!("Diagnosed {}", missing);
        return Some(missing);
    }

    None
}

/// Package hint for the first missing dependency in build output
pub fn diagnose(output: &str) -> Option<String> {
    detect_missing(output).map(|missing| missing.package_hint())
}
