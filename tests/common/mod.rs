// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use srctrack::InstallerConfig;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Makefile whose install target puts one file at /usr/local/bin/app
pub const APP_MAKEFILE: &str = "\
all:
\t@echo building app

install:
\tmkdir -p $(DESTDIR)/usr/local/bin
\techo app > $(DESTDIR)/usr/local/bin/app
";

/// One file in a generated source archive
pub struct SourceFile<'a> {
    pub name: &'a str,
    pub contents: &'a str,
    pub mode: u32,
}

impl<'a> SourceFile<'a> {
    pub fn new(name: &'a str, contents: &'a str) -> Self {
        Self {
            name,
            contents,
            mode: 0o644,
        }
    }

    pub fn executable(name: &'a str, contents: &'a str) -> Self {
        Self {
            name,
            contents,
            mode: 0o755,
        }
    }
}

/// Write `dir/file_name` as a gzip-tar archive
///
/// With `top`, every file is placed under that directory and the directory
/// entry comes first, the way release tarballs are laid out.
pub fn write_source_archive(
    dir: &Path,
    file_name: &str,
    top: Option<&str>,
    files: &[SourceFile<'_>],
) -> PathBuf {
    let path = dir.join(file_name);
    let encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    if let Some(top) = top {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        builder
            .append_data(&mut header, format!("{}/", top), std::io::empty())
            .unwrap();
    }

    for file in files {
        let member = match top {
            Some(top) => format!("{}/{}", top, file.name),
            None => file.name.to_string(),
        };
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(file.contents.len() as u64);
        header.set_mode(file.mode);
        builder
            .append_data(&mut header, member, file.contents.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
    path
}

/// A `name-version/Makefile` archive
pub fn make_project(dir: &Path, name: &str, version: &str, makefile: &str) -> PathBuf {
    let top = format!("{}-{}", name, version);
    write_source_archive(
        dir,
        &format!("{}.tar.gz", top),
        Some(&top),
        &[SourceFile::new("Makefile", makefile)],
    )
}

/// Installer config with a private work dir and a short poll interval
pub fn test_config(work_dir: &Path) -> InstallerConfig {
    InstallerConfig::default()
        .with_work_dir(work_dir)
        .with_poll_interval(Duration::from_millis(20))
}

/// Names of the entries left in a work dir
pub fn leftovers(work_dir: &Path) -> Vec<String> {
    fs::read_dir(work_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

/// Whether `make` is on PATH; prints a skip notice when it is not
pub fn have_make() -> bool {
    if which::which("make").is_ok() {
        true
    } else {
        eprintln!("make not available, skipping");
        false
    }
}
