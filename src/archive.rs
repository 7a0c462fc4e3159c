// src/archive.rs

//! Source archive reading: member listing, extraction and single-member reads
//!
//! Only gzip-compressed POSIX tar is understood. Extraction always lands in
//! a fresh temporary directory owned by an [`ExtractedArchive`], which
//! removes it again when dropped.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, Entry, EntryType};
use tempfile::TempDir;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Prefix for extraction directories
const EXTRACT_PREFIX: &str = "srctrack-src-";

/// One entry of a source archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveMember {
    /// Member name as stored in the archive, without a trailing slash
    pub name: String,
    pub is_dir: bool,
    /// Size of the member's data in bytes (0 for directories)
    pub size: u64,
}

/// Contents of a single archive member, as returned by [`read_member`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberContent {
    /// UTF-8 text
    Text(String),
    /// The member is a directory
    Directory,
    /// The member is not a regular file or its bytes are not valid UTF-8
    Binary,
}

impl MemberContent {
    /// The text, if the member was readable as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MemberContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// An archive unpacked into a temporary directory
///
/// The temporary directory (and everything below it) is deleted when this
/// value is dropped.
#[derive(Debug)]
pub struct ExtractedArchive {
    temp_dir: TempDir,
    root: PathBuf,
}

impl ExtractedArchive {
    /// The content root: the single top-level directory of the archive, or
    /// the temporary directory itself for flat archives
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The temporary directory the archive was unpacked into
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Drop for ExtractedArchive {
    fn drop(&mut self) {
        make_removable(self.temp_dir.path());
    }
}

fn open(path: &Path) -> Result<Archive<GzDecoder<File>>> {
    let file = File::open(path).map_err(|e| Error::archive(path, e))?;
    Ok(Archive::new(GzDecoder::new(file)))
}

/// Member name with any trailing slash removed
fn member_name<R: Read>(entry: &Entry<'_, R>) -> std::io::Result<String> {
    let path = entry.path()?;
    Ok(path.to_string_lossy().trim_end_matches('/').to_string())
}

/// Whether an entry only carries metadata (pax headers, GNU long names)
/// and is not a member of its own
///
/// `git archive` tarballs open with a `pax_global_header` entry.
fn is_metadata(entry_type: EntryType) -> bool {
    entry_type.is_pax_global_extensions()
        || entry_type.is_pax_local_extensions()
        || entry_type.is_gnu_longname()
        || entry_type.is_gnu_longlink()
}

/// List every member of a gzip-compressed tar archive
///
/// Either the complete member list is returned or an error; a stream that
/// breaks halfway through never yields a partial list.
pub fn list(path: &Path) -> Result<Vec<ArchiveMember>> {
    let mut archive = open(path)?;
    let mut members = Vec::new();

    for entry in archive.entries().map_err(|e| Error::archive(path, e))? {
        let entry = entry.map_err(|e| Error::archive(path, e))?;
        let entry_type = entry.header().entry_type();
        if is_metadata(entry_type) {
            continue;
        }
        members.push(ArchiveMember {
            name: member_name(&entry).map_err(|e| Error::archive(path, e))?,
            is_dir: entry_type.is_dir(),
            size: entry.size(),
        });
    }

    debug!("Listed {} members of {}", members.len(), path.display());
    Ok(members)
}

/// Extract an archive into a new temporary directory under the system
/// temp location
pub fn extract(path: &Path) -> Result<ExtractedArchive> {
    extract_in(path, &std::env::temp_dir())
}

/// Extract an archive into a new temporary directory under `parent`
///
/// On failure the temporary directory has already been removed when the
/// error is returned.
pub fn extract_in(path: &Path, parent: &Path) -> Result<ExtractedArchive> {
    let temp_dir = tempfile::Builder::new()
        .prefix(EXTRACT_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| Error::archive(path, format!("failed to create temporary directory: {}", e)))?;

    info!("Extracting {} to {}", path.display(), temp_dir.path().display());

    // Owned from here on so a failed unpack still goes through Drop
    let mut extracted = ExtractedArchive {
        root: temp_dir.path().to_path_buf(),
        temp_dir,
    };

    let top_level = first_member_top_level(path)?;
    open(path)?
        .unpack(extracted.temp_dir.path())
        .map_err(|e| Error::archive(path, e))?;

    if let Some(dir) = top_level {
        extracted.root = extracted.temp_dir.path().join(dir);
    }

    debug!("Source root: {}", extracted.root.display());
    Ok(extracted)
}

/// Top-level directory named by the first member (if it has one)
fn first_member_top_level(path: &Path) -> Result<Option<PathBuf>> {
    let mut archive = open(path)?;

    for entry in archive.entries().map_err(|e| Error::archive(path, e))? {
        let entry = entry.map_err(|e| Error::archive(path, e))?;
        let entry_type = entry.header().entry_type();
        if is_metadata(entry_type) {
            continue;
        }
        let name = entry.path().map_err(|e| Error::archive(path, e))?;
        return Ok(top_level_dir(&name, entry_type.is_dir()));
    }

    Ok(None)
}

/// Give the owner write access to every directory below `dir`
///
/// Archives may unpack read-only directories, which would otherwise stop
/// the temporary directory from being removed.
fn make_removable(dir: &Path) {
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_dir() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let mode = metadata.permissions().mode();
        if mode & 0o700 != 0o700 {
            let permissions = std::fs::Permissions::from_mode(mode | 0o700);
            if let Err(e) = std::fs::set_permissions(entry.path(), permissions) {
                warn!("Cannot make {} writable: {}", entry.path().display(), e);
            }
        }
    }
}

/// First normal component of `name`, if `name` has a directory part
fn top_level_dir(name: &Path, is_dir: bool) -> Option<PathBuf> {
    let mut components = name.components().filter_map(|c| match c {
        Component::Normal(part) => Some(part),
        _ => None,
    });

    let first = components.next()?;
    if components.next().is_some() || is_dir {
        Some(PathBuf::from(first))
    } else {
        None
    }
}

/// Read a single member's contents
///
/// A missing member is an error. A directory or a member that cannot be
/// shown as text is reported through [`MemberContent`] instead.
pub fn read_member(path: &Path, name: &str) -> Result<MemberContent> {
    let wanted = name.trim_end_matches('/');
    let mut archive = open(path)?;

    for entry in archive.entries().map_err(|e| Error::archive(path, e))? {
        let mut entry = entry.map_err(|e| Error::archive(path, e))?;
        let entry_type = entry.header().entry_type();
        if is_metadata(entry_type) {
            continue;
        }
        if member_name(&entry).map_err(|e| Error::archive(path, e))? != wanted {
            continue;
        }

        if entry_type.is_dir() {
            return Ok(MemberContent::Directory);
        }
        if !entry_type.is_file() {
            return Ok(MemberContent::Binary);
        }

        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| Error::archive(path, e))?;

        return Ok(match String::from_utf8(bytes) {
            Ok(text) => MemberContent::Text(text),
            Err(_) => MemberContent::Binary,
        });
    }

    Err(Error::archive(path, format!("member '{}' not found", name)))
}
