//! SQLite store access for Scipion project files.
//!
//! # Responsibility
//! - Open and configure read-only SQLite connections over source stores.
//! - Provide small shared introspection helpers (table existence).
//!
//! # Invariants
//! - Connections returned by this module are read-only; no write statement
//!   is ever issued against a source store.
//! - Connection lifetime is scoped to one conversion call.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::open_store;

use rusqlite::{Connection, OptionalExtension};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Returns whether a table with the given name exists in the store.
pub fn table_exists(conn: &Connection, name: &str) -> DbResult<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Counts tables whose names match the given GLOB pattern.
pub fn count_tables_matching(conn: &Connection, pattern: &str) -> DbResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name GLOB ?1;",
        [pattern],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}
