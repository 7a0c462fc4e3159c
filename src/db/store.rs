// src/db/store.rs

//! The package store: package rows plus their file manifests

use super::models::{InstalledFile, Package};
use crate::error::Result;
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Store handle shared with install workers
///
/// The mutex serializes writers: two packages' inserts never interleave.
pub type SharedStore = Arc<Mutex<PackageStore>>;

/// Persistent record of tracked packages and the files they installed
///
/// Assumes a single writing process. Within a process, share it as a
/// [`SharedStore`].
#[derive(Debug)]
pub struct PackageStore {
    conn: Connection,
}

impl PackageStore {
    /// Open (creating if needed) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: super::open(path)?,
        })
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: super::open_in_memory()?,
        })
    }

    /// Wrap this store for sharing with install workers
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Record a package and its manifest as one transaction
    ///
    /// Either the package row and every file row become visible, or none
    /// of them do. Every path must be absolute.
    pub fn add_package(&mut self, name: &str, version: &str, files: &[String]) -> Result<i64> {
        let package_id = super::transaction(&mut self.conn, |tx| {
            let mut package = Package::new(name.to_string(), version.to_string());
            let package_id = package.insert(tx)?;

            for path in files {
                InstalledFile::new(package_id, path.clone())?.insert(tx)?;
            }

            Ok(package_id)
        })?;

        info!(
            "Recorded package {}-{} (id {}, {} files)",
            name,
            version,
            package_id,
            files.len()
        );
        Ok(package_id)
    }

    /// Every path recorded for a package
    pub fn files_for(&self, package_id: i64) -> Result<HashSet<String>> {
        let files = InstalledFile::find_by_package(&self.conn, package_id)?;
        debug!("Package {} has {} files", package_id, files.len());
        Ok(files.into_iter().map(|f| f.path).collect())
    }

    pub fn get_package(&self, package_id: i64) -> Result<Option<Package>> {
        Package::find_by_id(&self.conn, package_id)
    }

    pub fn list_packages(&self) -> Result<Vec<Package>> {
        Package::list_all(&self.conn)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Vec<Package>> {
        Package::find_by_name(&self.conn, name)
    }

    /// Packages that recorded `path` in their manifest
    pub fn owners_of(&self, path: &str) -> Result<Vec<Package>> {
        Package::find_by_file(&self.conn, path)
    }

    /// Underlying connection, for ad-hoc queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_and_read_back() {
        let mut store = PackageStore::open_in_memory().unwrap();
        let files = paths(&[
            "/usr/local/bin/test-app",
            "/usr/local/lib/libtest.so",
            "/usr/local/share/doc/test-package/README",
        ]);

        let id = store.add_package("test-package", "1.0", &files).unwrap();
        let stored = store.files_for(id).unwrap();
        assert_eq!(stored, files.iter().cloned().collect::<HashSet<_>>());

        let package = store.get_package(id).unwrap().unwrap();
        assert_eq!(package.name, "test-package");
        assert_eq!(package.version, "1.0");
        assert!(package.install_timestamp.is_some());
    }

    #[test]
    fn test_files_independent_of_insertion_order() {
        let mut store = PackageStore::open_in_memory().unwrap();
        let forward = paths(&["/a", "/b/c", "/d/e/f"]);
        let mut reversed = forward.clone();
        reversed.reverse();

        let first = store.add_package("one", "1.0", &forward).unwrap();
        let second = store.add_package("two", "1.0", &reversed).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.files_for(first).unwrap(), store.files_for(second).unwrap());
    }

    #[test]
    fn test_add_is_all_or_nothing() {
        let mut store = PackageStore::open_in_memory().unwrap();
        let files = paths(&["/usr/bin/ok", "relative/path", "/usr/bin/never"]);

        let result = store.add_package("broken", "0.1", &files);
        assert!(matches!(result, Err(Error::InvalidPath(_))));
        assert!(store.list_packages().unwrap().is_empty());

        let count: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM installed_files", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_files_for_unknown_package() {
        let store = PackageStore::open_in_memory().unwrap();
        assert!(store.files_for(42).unwrap().is_empty());
        assert!(store.get_package(42).unwrap().is_none());
    }

    #[test]
    fn test_queries() {
        let mut store = PackageStore::open_in_memory().unwrap();
        let a = store.add_package("zlib", "1.3", &paths(&["/usr/lib/libz.so"])).unwrap();
        let b = store
            .add_package("zlib", "1.3.1", &paths(&["/usr/lib/libz.so", "/usr/include/zlib.h"]))
            .unwrap();
        store.add_package("curl", "8.0", &paths(&["/usr/bin/curl"])).unwrap();

        assert_eq!(store.list_packages().unwrap().len(), 3);

        let zlibs = store.find_by_name("zlib").unwrap();
        assert_eq!(zlibs.len(), 2);
        assert_eq!(zlibs[0].id, Some(a));

        let owners = store.owners_of("/usr/lib/libz.so").unwrap();
        let ids: Vec<Option<i64>> = owners.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![Some(a), Some(b)]);
        assert!(store.owners_of("/nowhere").unwrap().is_empty());
    }

    #[test]
    fn test_open_on_disk_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested/dir/library.db");

        let id = {
            let mut store = PackageStore::open(&db_path).unwrap();
            store.add_package("tool", "2.3.1", &paths(&["/usr/bin/tool"])).unwrap()
        };

        // Reopening is idempotent and sees the earlier rows
        let store = PackageStore::open(&db_path).unwrap();
        assert_eq!(store.files_for(id).unwrap().len(), 1);
    }
}
