// src/install/naming.rs

//! Package name and version derived from an archive's file name
//!
//! A heuristic: name components that start with a digit are dropped, so
//! `gtk-3-demo-1.0.tar.gz` is recorded as `gtk-demo`. Kept as-is so
//! existing records stay comparable.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\d+\.\d+\.\d+|\d+\.\d+").unwrap());

const ARCHIVE_SUFFIX: &str = ".tar.gz";
const UNKNOWN_NAME: &str = "unknown_package";
const UNKNOWN_VERSION: &str = "unknown";

/// Name and version recorded for an installed archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageIdent {
    pub name: String,
    pub version: String,
}

impl PackageIdent {
    pub fn from_archive_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_file_name(&file_name)
    }

    pub fn from_file_name(file_name: &str) -> Self {
        Self {
            name: package_name(file_name),
            version: package_version(file_name),
        }
    }
}

impl fmt::Display for PackageIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// Hyphen-separated components of the file name that do not start with a
/// digit
pub fn package_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(file_name);
    let name = stem
        .split('-')
        .filter(|part| !part.starts_with(|c: char| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join("-");

    if name.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        name
    }
}

/// First `X.Y.Z` or `X.Y` run of digits in the file name
pub fn package_version(file_name: &str) -> String {
    VERSION_RE
        .find(file_name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(file_name: &str) -> (String, String) {
        let ident = PackageIdent::from_file_name(file_name);
        (ident.name, ident.version)
    }

    #[test]
    fn test_plain_versioned_name() {
        assert_eq!(ident("mytool-2.3.1.tar.gz"), ("mytool".into(), "2.3.1".into()));
        assert_eq!(ident("dummy_ok-1.0.tar.gz"), ("dummy_ok".into(), "1.0".into()));
    }

    #[test]
    fn test_no_version() {
        assert_eq!(ident("dummy_inspect.tar.gz"), ("dummy_inspect".into(), "unknown".into()));
    }

    #[test]
    fn test_hyphenated_name() {
        assert_eq!(
            ident("python-dateutil-2.8.2.tar.gz"),
            ("python-dateutil".into(), "2.8.2".into())
        );
    }

    #[test]
    fn test_digit_leading_components_dropped() {
        assert_eq!(ident("gtk-3-demo-1.0.tar.gz"), ("gtk-demo".into(), "1.0".into()));
        assert_eq!(ident("2048-game-1.0.tar.gz"), ("game".into(), "1.0".into()));
    }

    #[test]
    fn test_empty_name_falls_back() {
        assert_eq!(ident("1.0.tar.gz"), ("unknown_package".into(), "1.0".into()));
    }

    #[test]
    fn test_version_first_match_wins() {
        assert_eq!(package_version("lib-1.2.3.4-2.0.tar.gz"), "1.2.3");
        assert_eq!(package_version("foo-v1.2.tar.gz"), "1.2");
        assert_eq!(package_name("foo-v1.2.tar.gz"), "foo-v1.2");
    }

    #[test]
    fn test_from_archive_path_uses_file_name() {
        let ident = PackageIdent::from_archive_path(Path::new("/downloads/2.0/zlib-1.3.1.tar.gz"));
        assert_eq!(ident.to_string(), "zlib-1.3.1");
    }
}
