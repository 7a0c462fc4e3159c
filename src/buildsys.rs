// src/buildsys.rs

//! Build system detection and the fixed command table per build system

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Build systems srctrack knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildSystem {
    /// `configure` script, then make
    Autotools,
    /// `CMakeLists.txt`, in-tree build
    Cmake,
    /// `setup.py`
    PythonSetuptools,
    /// Plain `Makefile`
    Make,
}

impl BuildSystem {
    /// Marker files in detection priority order
    const MARKERS: [(&'static str, BuildSystem); 4] = [
        ("configure", BuildSystem::Autotools),
        ("CMakeLists.txt", BuildSystem::Cmake),
        ("setup.py", BuildSystem::PythonSetuptools),
        ("Makefile", BuildSystem::Make),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildSystem::Autotools => "autotools",
            BuildSystem::Cmake => "cmake",
            BuildSystem::PythonSetuptools => "python-setuptools",
            BuildSystem::Make => "make",
        }
    }

    /// Ordered commands for this build system
    pub fn commands(&self) -> Vec<CommandSpec> {
        match self {
            BuildSystem::Autotools => vec![
                CommandSpec::build(&["./configure"]),
                CommandSpec::build(&["make"]),
                CommandSpec::install(&["make", "install"]),
            ],
            BuildSystem::Cmake => vec![
                CommandSpec::build(&["cmake", "."]),
                CommandSpec::build(&["make"]),
                CommandSpec::install(&["make", "install"]),
            ],
            BuildSystem::PythonSetuptools => {
                vec![CommandSpec::install(&["python3", "setup.py", "install"])]
            }
            BuildSystem::Make => vec![
                CommandSpec::build(&["make"]),
                CommandSpec::install(&["make", "install"]),
            ],
        }
    }
}

impl fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a source tree by the marker files at its root
///
/// Returns `None` when no known build system is present.
pub fn detect(root: &Path) -> Option<BuildSystem> {
    let found = BuildSystem::MARKERS
        .iter()
        .find(|(marker, _)| root.join(marker).exists())
        .map(|(_, kind)| *kind);

    match found {
        Some(kind) => debug!("Detected build system {} in {}", kind, root.display()),
        None => debug!("No known build system in {}", root.display()),
    }
    found
}

/// What a command is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandRole {
    Build,
    Install,
}

/// One command of a build system's sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub args: Vec<String>,
    pub role: CommandRole,
}

impl CommandSpec {
    fn new(args: &[&str], role: CommandRole) -> Self {
        Self {
            args: args.iter().map(|s| s.to_string()).collect(),
            role,
        }
    }

    pub fn build(args: &[&str]) -> Self {
        Self::new(args, CommandRole::Build)
    }

    pub fn install(args: &[&str]) -> Self {
        Self::new(args, CommandRole::Install)
    }

    /// The program to run (first argument)
    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    /// Arguments after the program
    pub fn arguments(&self) -> &[String] {
        self.args.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, name: &str) {
        fs::write(root.join(name), b"").unwrap();
    }

    #[test]
    fn test_detect_each_kind() {
        for (marker, expected) in BuildSystem::MARKERS {
            let dir = tempfile::tempdir().unwrap();
            touch(dir.path(), marker);
            assert_eq!(detect(dir.path()), Some(expected), "marker {}", marker);
        }
    }

    #[test]
    fn test_detect_configure_wins_over_makefile() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Makefile");
        touch(dir.path(), "configure");
        assert_eq!(detect(dir.path()), Some(BuildSystem::Autotools));
    }

    #[test]
    fn test_detect_cmake_wins_over_setup_py() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "setup.py");
        touch(dir.path(), "CMakeLists.txt");
        touch(dir.path(), "Makefile");
        assert_eq!(detect(dir.path()), Some(BuildSystem::Cmake));
    }

    #[test]
    fn test_detect_none() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "README");
        assert_eq!(detect(dir.path()), None);
    }

    #[test]
    fn test_detect_ignores_nested_markers() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub"), "Makefile");
        assert_eq!(detect(dir.path()), None);
    }

    #[test]
    fn test_command_table() {
        let autotools = BuildSystem::Autotools.commands();
        let rendered: Vec<String> = autotools.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered, ["./configure", "make", "make install"]);
        assert_eq!(autotools[2].role, CommandRole::Install);

        let python = BuildSystem::PythonSetuptools.commands();
        assert_eq!(python.len(), 1);
        assert_eq!(python[0].role, CommandRole::Install);
        assert_eq!(python[0].program(), "python3");
        assert_eq!(python[0].arguments(), ["setup.py", "install"]);

        for kind in [BuildSystem::Autotools, BuildSystem::Cmake, BuildSystem::Make] {
            let commands = kind.commands();
            let install_count = commands
                .iter()
                .filter(|c| c.role == CommandRole::Install)
                .count();
            assert_eq!(install_count, 1);
            assert_eq!(commands.last().unwrap().role, CommandRole::Install);
        }
    }
}
