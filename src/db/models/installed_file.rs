// src/db/models/installed_file.rs

//! InstalledFile model - one manifest entry of a package

use crate::error::{Error, Result};
use rusqlite::{Connection, Row, params};

/// An absolute path a package placed on the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledFile {
    pub id: Option<i64>,
    pub package_id: i64,
    pub path: String,
}

impl InstalledFile {
    /// Create a new InstalledFile
    ///
    /// Fails if `path` is not absolute.
    pub fn new(package_id: i64, path: String) -> Result<Self> {
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(format!(
                "manifest entries must be absolute: {}",
                path
            )));
        }

        Ok(Self {
            id: None,
            package_id,
            path,
        })
    }

    /// Insert this file into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO installed_files (package_id, path) VALUES (?1, ?2)",
            params![&self.package_id, &self.path],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find all files belonging to a package
    pub fn find_by_package(conn: &Connection, package_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, package_id, path FROM installed_files WHERE package_id = ?1",
        )?;

        let files = stmt
            .query_map([package_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(files)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            package_id: row.get(1)?,
            path: row.get(2)?,
        })
    }
}
