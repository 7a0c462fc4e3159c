// src/db/mod.rs

//! SQLite-backed package store
//!
//! Two tables: `packages` and `installed_files`, see [`schema`]. Writes go
//! through [`transaction`] so a package and its manifest land together.

pub mod models;
pub mod paths;
pub mod schema;
mod store;

pub use store::{PackageStore, SharedStore};

use crate::error::Result;
use rusqlite::{Connection, Transaction};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Create the database at `db_path` if needed and bring its schema up to
/// date
pub fn init(db_path: &Path) -> Result<()> {
    open(db_path)?;
    Ok(())
}

/// Open a database connection, creating the parent directory and applying
/// migrations
pub fn open(db_path: &Path) -> Result<Connection> {
    let dir = paths::db_dir(db_path);
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    debug!("Opening database {}", db_path.display());
    let conn = Connection::open(db_path)?;
    configure(&conn)?;
    Ok(conn)
}

/// Open a private in-memory database with the current schema
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    schema::migrate(conn)
}

/// Run `f` inside a transaction, committing only if it succeeds
///
/// Dropping the transaction on the error path rolls it back.
pub fn transaction<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
