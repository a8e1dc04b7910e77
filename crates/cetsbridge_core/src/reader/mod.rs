//! Projected, schema-resolved record reading.
//!
//! # Responsibility
//! - Build a SELECT over exactly the physical columns a [`SchemaMap`]
//!   resolves for the requested semantic fields, each aliased back to its
//!   semantic name.
//! - Stream the resulting rows as field-addressable [`RawRecord`]s.
//!
//! # Invariants
//! - Requested fields the scope does not carry are silently excluded from
//!   the projection; they surface as absent values, never as query errors.
//! - The cursor is forward-only and not restartable; it must be consumed
//!   before the enclosing statement is dropped.
//! - Row order is the storage engine's natural order; no ORDER BY is added.
//!   Call sites correlating two sequences by position document that both
//!   come from the same kind of scoped enumeration.

use crate::db::DbError;
use crate::schema::locator::quote_ident;
use crate::schema::SchemaMap;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Rows, Statement};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ReadResult<T> = Result<T, ReadError>;

#[derive(Debug)]
pub enum ReadError {
    Db(DbError),
    /// The filter field is not present in the scope's schema; an equality
    /// restriction cannot be applied against an unknown column.
    UnresolvedFilterField { table: String, field: String },
    /// None of the requested fields resolve in this scope.
    EmptyProjection { table: String },
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnresolvedFilterField { table, field } => {
                write!(f, "filter field `{field}` is not mapped in scope `{table}`")
            }
            Self::EmptyProjection { table } => {
                write!(f, "no requested field is mapped in scope `{table}`")
            }
        }
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UnresolvedFilterField { .. } | Self::EmptyProjection { .. } => None,
        }
    }
}

impl From<DbError> for ReadError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ReadError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Equality restriction on one semantic field.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// One projected row, addressable by semantic field name only.
///
/// SQL NULL and fields excluded from the projection both read back as
/// absent; downstream code never distinguishes the two.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    values: BTreeMap<String, Value>,
}

impl RawRecord {
    fn value(&self, field: &str) -> Option<&Value> {
        match self.values.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.value(field) {
            Some(Value::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn real(&self, field: &str) -> Option<f64> {
        match self.value(field) {
            Some(Value::Real(value)) => Some(*value),
            Some(Value::Integer(value)) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        match self.value(field) {
            Some(Value::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn boolean(&self, field: &str) -> Option<bool> {
        self.integer(field).map(|value| value != 0)
    }
}

/// Prepared, projected read over one located table.
#[derive(Debug)]
pub struct RecordReader<'conn> {
    stmt: Statement<'conn>,
    fields: Vec<String>,
    params: Vec<Value>,
}

impl<'conn> RecordReader<'conn> {
    /// Prepares a projection over the physical columns `schema` resolves
    /// for `requested_fields`, optionally restricted by `filter`.
    ///
    /// # Errors
    /// - [`ReadError::EmptyProjection`] when no requested field resolves.
    /// - [`ReadError::UnresolvedFilterField`] when the filter field does
    ///   not resolve.
    pub fn prepare(
        conn: &'conn Connection,
        table: &str,
        schema: &SchemaMap,
        requested_fields: &[&str],
        filter: Option<Filter>,
    ) -> ReadResult<Self> {
        let mut fields = Vec::new();
        let mut projection = Vec::new();
        for field in requested_fields {
            if let Some(column) = schema.column(field) {
                projection.push(format!(
                    "{} AS {}",
                    quote_ident(column),
                    quote_ident(field)
                ));
                fields.push((*field).to_string());
            }
        }
        if projection.is_empty() {
            return Err(ReadError::EmptyProjection {
                table: table.to_string(),
            });
        }

        let mut sql = format!(
            "SELECT {} FROM {}",
            projection.join(", "),
            quote_ident(table)
        );
        let mut params = Vec::new();
        if let Some(filter) = filter {
            let column =
                schema
                    .column(&filter.field)
                    .ok_or_else(|| ReadError::UnresolvedFilterField {
                        table: table.to_string(),
                        field: filter.field.clone(),
                    })?;
            sql.push_str(&format!(" WHERE {} = ?1", quote_ident(column)));
            params.push(filter.value);
        }
        sql.push(';');

        let stmt = conn.prepare(&sql)?;
        Ok(Self {
            stmt,
            fields,
            params,
        })
    }

    /// Executes the query and returns the forward-only record cursor.
    pub fn query(&mut self) -> ReadResult<RecordRows<'_>> {
        let rows = self.stmt.query(params_from_iter(self.params.iter()))?;
        Ok(RecordRows {
            rows,
            fields: &self.fields,
        })
    }

    /// Convenience for callers that want the whole scope in memory.
    pub fn read_all(&mut self) -> ReadResult<Vec<RawRecord>> {
        let mut rows = self.query()?;
        let mut records = Vec::new();
        while let Some(record) = rows.next_record()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Forward-only cursor over projected records.
///
/// Advance-style streaming in the manner of `rusqlite::Rows`: each call
/// fetches the next row or `None` at exhaustion.
pub struct RecordRows<'stmt> {
    rows: Rows<'stmt>,
    fields: &'stmt [String],
}

impl RecordRows<'_> {
    pub fn next_record(&mut self) -> ReadResult<Option<RawRecord>> {
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };
        let mut values = BTreeMap::new();
        for (index, field) in self.fields.iter().enumerate() {
            let value: Value = row.get(index)?;
            values.insert(field.clone(), value);
        }
        Ok(Some(RawRecord { values }))
    }
}
