//! Schema-indirection resolution.
//!
//! Scipion stores do not use a fixed physical schema: every logical table
//! carries a paired `Classes` table mapping semantic labels (`_tsId`) to the
//! physical column names actually used in the data table (`c03`).
//!
//! # Responsibility
//! - Resolve one scope's classes table into an immutable [`SchemaMap`].
//!
//! # Invariants
//! - A `SchemaMap` is built once per scope and never mutated afterwards.
//! - A label absent from the map means "field not present in this scope";
//!   lookups return `None` and never fail.

use crate::db::{table_exists, DbError};
use log::info;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod locator;

pub use locator::{locate, ScopeKey, TablePair, CLASSES_TBL, OBJECTS_TBL, PROPERTIES_TBL};

/// Column of a classes table holding the semantic label.
pub const LABEL_PROPERTY: &str = "label_property";
/// Column of a classes table holding the physical column name.
pub const COLUMN_NAME: &str = "column_name";

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug)]
pub enum SchemaError {
    /// The scope's mapping table does not exist in the store. Fatal to that
    /// scope's assembly; there is no fallback scope.
    MissingMappingTable(String),
    Db(DbError),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMappingTable(table) => {
                write!(f, "schema mapping table not found: {table}")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingMappingTable(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for SchemaError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SchemaError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Immutable mapping from semantic field label to physical column name,
/// scoped to exactly one data table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMap {
    entries: BTreeMap<String, String>,
}

impl SchemaMap {
    /// Returns the physical column for a semantic label, or `None` when the
    /// field is not present in this scope.
    pub fn column(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    /// Returns whether this scope carries the given field.
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves a scope's classes table into a [`SchemaMap`].
///
/// Reads every `(label_property, column_name)` row of `classes_table`.
///
/// # Errors
/// - [`SchemaError::MissingMappingTable`] when the table does not exist.
pub fn map_classes_table(conn: &Connection, classes_table: &str) -> SchemaResult<SchemaMap> {
    if !table_exists(conn, classes_table)? {
        return Err(SchemaError::MissingMappingTable(classes_table.to_string()));
    }

    let sql = format!(
        "SELECT \"{LABEL_PROPERTY}\", \"{COLUMN_NAME}\" FROM {};",
        locator::quote_ident(classes_table)
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut entries = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let label: String = row.get(0)?;
        let column: String = row.get(1)?;
        entries.insert(label, column);
    }

    info!(
        "event=schema_resolve module=schema status=ok table={} fields={}",
        classes_table,
        entries.len()
    );
    Ok(SchemaMap { entries })
}
