//! Entity assembly: one converter per entity family.
//!
//! # Responsibility
//! - Compose schema resolution, table location, record reading and geometry
//!   decomposition into normalized output entities.
//! - Perform cross-entity linking (CTF-to-image by position, particle sets
//!   by shared tomogram identifier).
//!
//! # Invariants
//! - Every converter opens its store read-only, scoped to one `convert`
//!   call; the connection is released on every exit path.
//! - Source stores are never written.

use crate::db::DbError;
use crate::geom::GeometryParseError;
use crate::project::StorePathError;
use crate::reader::ReadError;
use crate::schema::SchemaError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub mod coordinates;
pub mod ctf;
pub mod fields;
pub mod subtomograms;
pub mod tilt_series;
pub mod tomograms;

pub use coordinates::CoordinateConverter;
pub use ctf::{CtfBySeries, CtfConverter};
pub use subtomograms::SubtomogramConverter;
pub use tilt_series::TiltSeriesConverter;
pub use tomograms::{ParticleSource, TomogramConverter};

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug)]
pub enum ConvertError {
    StorePath(StorePathError),
    Db(DbError),
    Schema(SchemaError),
    Read(ReadError),
    Geometry(GeometryParseError),
    /// A required identifier field is not present; cross-linking would be
    /// undefined without it.
    MissingField { table: String, field: &'static str },
    /// Number of index-keyed CTF sub-tables does not match the master
    /// enumeration count; positional correlation cannot be trusted.
    CtfCountMismatch { series: usize, tables: usize },
    InvalidData(String),
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorePath(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::Read(err) => write!(f, "{err}"),
            Self::Geometry(err) => write!(f, "{err}"),
            Self::MissingField { table, field } => {
                write!(f, "required field `{field}` missing in table `{table}`")
            }
            Self::CtfCountMismatch { series, tables } => write!(
                f,
                "CTF store has {tables} series sub-tables for {series} enumerated series"
            ),
            Self::InvalidData(message) => write!(f, "invalid source data: {message}"),
        }
    }
}

impl Error for ConvertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorePath(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Read(err) => Some(err),
            Self::Geometry(err) => Some(err),
            Self::MissingField { .. } | Self::CtfCountMismatch { .. } | Self::InvalidData(_) => {
                None
            }
        }
    }
}

impl From<StorePathError> for ConvertError {
    fn from(value: StorePathError) -> Self {
        Self::StorePath(value)
    }
}

impl From<DbError> for ConvertError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SchemaError> for ConvertError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<ReadError> for ConvertError {
    fn from(value: ReadError) -> Self {
        Self::Read(value)
    }
}

impl From<GeometryParseError> for ConvertError {
    fn from(value: GeometryParseError) -> Self {
        Self::Geometry(value)
    }
}

/// What to do when a record's matrix literal fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatrixPolicy {
    /// Abort the whole conversion on the first malformed matrix.
    #[default]
    Abort,
    /// Drop the offending record with a warning and continue.
    SkipRecord,
}

/// Caller-visible conversion options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub matrix_policy: MatrixPolicy,
}

/// Splits a comma-joined odd/even filename pair into `(even, odd)`.
///
/// The pair is assigned by lexicographic sort: first sorted element is the
/// even path, second the odd one. Fixed, non-configurable tie-break matching
/// the producing application's convention. Any shape other than exactly two
/// components is normalized to both-absent.
pub(crate) fn split_odd_even(joined: &str) -> (Option<String>, Option<String>) {
    let mut parts: Vec<&str> = joined
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 2 {
        if !joined.trim().is_empty() {
            warn!(
                "event=odd_even_split module=convert status=skip reason=component_count value={joined}"
            );
        }
        return (None, None);
    }
    parts.sort_unstable();
    (Some(parts[0].to_string()), Some(parts[1].to_string()))
}

/// Resolves a store-relative filename against the project root.
pub(crate) fn resolve_project_path(project_root: &Path, file: Option<&str>) -> Option<String> {
    file.map(|name| project_root.join(name).to_string_lossy().into_owned())
}
