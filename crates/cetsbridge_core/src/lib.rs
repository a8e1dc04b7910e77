//! Conversion engine for Scipion tomography metadata.
//!
//! Normalizes per-protocol SQLite stores (schema-indirected tables,
//! dynamically-named per-entity sub-tables) into a fixed CETS-style entity
//! model: tilt series, tilt images, CTF records, tomograms, 3D coordinates
//! and subtomograms, with reconstructed geometric transforms.

pub mod convert;
pub mod db;
pub mod geom;
pub mod image;
pub mod logging;
pub mod model;
pub mod project;
pub mod reader;
pub mod schema;

pub use convert::{
    ConvertError, ConvertOptions, ConvertResult, CoordinateConverter, CtfBySeries, CtfConverter,
    MatrixPolicy, ParticleSource, SubtomogramConverter, TiltSeriesConverter, TomogramConverter,
};
pub use image::{ImageInfo, ImageMeta, MissingImageMeta};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    Affine, Coordinate3D, CoordinateTransformation, CtfRecord, ParticleSet, Subtomogram,
    TiltImage, TiltSeries, Tomogram, Translation,
};
pub use project::{project_root_for, validate_store_path, StorePathError};
pub use schema::{locate, ScopeKey, SchemaError, SchemaMap, TablePair};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
