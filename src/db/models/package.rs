// src/db/models/package.rs

//! Package model - one tracked install

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;

const SELECT_COLUMNS: &str = "SELECT id, name, version, install_timestamp FROM packages";

/// A Package is a source archive that was installed and tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub id: Option<i64>,
    pub name: String,
    pub version: String,
    /// Set by the database on insert (`CURRENT_TIMESTAMP`, UTC)
    pub install_timestamp: Option<String>,
}

impl Package {
    /// Create a new Package
    pub fn new(name: String, version: String) -> Self {
        Self {
            id: None,
            name,
            version,
            install_timestamp: None,
        }
    }

    /// Insert this package into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO packages (name, version) VALUES (?1, ?2)",
            params![&self.name, &self.version],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a package by ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;
        let package = stmt.query_row([id], Self::from_row).optional()?;
        Ok(package)
    }

    /// Find packages by name, oldest first
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{} WHERE name = ?1 ORDER BY id", SELECT_COLUMNS))?;
        let packages = stmt
            .query_map([name], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(packages)
    }

    /// List all packages, oldest first
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let packages = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(packages)
    }

    /// Packages whose manifest contains `path`
    pub fn find_by_file(conn: &Connection, path: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT p.id, p.name, p.version, p.install_timestamp
             FROM packages p
             JOIN installed_files f ON f.package_id = p.id
             WHERE f.path = ?1
             ORDER BY p.id",
        )?;
        let packages = stmt
            .query_map([path], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(packages)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            version: row.get(2)?,
            install_timestamp: row.get(3)?,
        })
    }
}
