//! 3D coordinate assembly.
//!
//! Coordinates from all tomograms live in one flat master table; the
//! converter filters by tomogram identifier per invocation. A picked point
//! carries position and orientation only: no path, no size.

use crate::convert::fields::{COORDINATE_FIELDS, COORD_MATRIX, COORD_X, COORD_Y, COORD_Z, TOMO_ID};
use crate::convert::{ConvertError, ConvertOptions, ConvertResult, MatrixPolicy};
use crate::db::open_store;
use crate::geom::{orientation_block, parse_matrix_literal, OrientationKind};
use crate::model::tomogram::Coordinate3D;
use crate::project::validate_store_path;
use crate::reader::{Filter, RawRecord, RecordReader};
use crate::schema::{map_classes_table, CLASSES_TBL, OBJECTS_TBL};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Converts the coordinate rows belonging to one tomogram at a time.
pub struct CoordinateConverter {
    store_path: PathBuf,
    options: ConvertOptions,
}

impl CoordinateConverter {
    pub fn new(store_path: impl AsRef<Path>) -> ConvertResult<Self> {
        let store_path = validate_store_path(store_path)?;
        Ok(Self {
            store_path,
            options: ConvertOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads the coordinates picked on the given tomogram.
    ///
    /// No matching rows is not an error; the result is an empty set.
    pub fn convert_for(&self, tomo_id: &str) -> ConvertResult<Vec<Coordinate3D>> {
        let conn = open_store(&self.store_path)?;
        let schema = map_classes_table(&conn, CLASSES_TBL)?;

        let mut reader = RecordReader::prepare(
            &conn,
            OBJECTS_TBL,
            &schema,
            COORDINATE_FIELDS,
            Some(Filter::equals(TOMO_ID, tomo_id.to_string())),
        )?;
        let mut rows = reader.query()?;

        let mut coordinates = Vec::new();
        while let Some(record) = rows.next_record()? {
            match self.coordinate_from_record(&record) {
                Ok(coordinate) => coordinates.push(coordinate),
                Err(ConvertError::Geometry(err))
                    if self.options.matrix_policy == MatrixPolicy::SkipRecord =>
                {
                    warn!(
                        "event=record_skip module=convert tomo_id={tomo_id} reason=geometry error={err}"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            "event=coordinates module=convert status=ok tomo_id={tomo_id} coordinates={}",
            coordinates.len()
        );
        Ok(coordinates)
    }

    fn coordinate_from_record(&self, record: &RawRecord) -> ConvertResult<Coordinate3D> {
        let orientation = match record.text(COORD_MATRIX) {
            Some(literal) => {
                let matrix = parse_matrix_literal(literal)?;
                Some(orientation_block(&matrix, OrientationKind::Coordinate)?)
            }
            None => None,
        };

        Ok(Coordinate3D {
            position: [
                record.real(COORD_X),
                record.real(COORD_Y),
                record.real(COORD_Z),
            ],
            orientation,
        })
    }
}
