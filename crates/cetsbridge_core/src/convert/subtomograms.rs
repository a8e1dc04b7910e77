//! Subtomogram assembly.
//!
//! Each subtomogram row carries two orientation matrices: the picking
//! coordinate's and the subtomogram's own refined alignment. Both are
//! decomposed with the 3D-orientation variant and attached in that fixed
//! order.

use crate::convert::fields::{
    FILE_NAME, SUBTOMO_COORD_MATRIX, SUBTOMO_FIELDS, SUBTOMO_X, SUBTOMO_Y, SUBTOMO_Z, TOMO_ID,
    TRANSFORMATION_MATRIX,
};
use crate::convert::{
    resolve_project_path, ConvertError, ConvertOptions, ConvertResult, MatrixPolicy,
};
use crate::db::open_store;
use crate::geom::{orientation_block, parse_matrix_literal, OrientationKind};
use crate::image::ImageMeta;
use crate::model::tomogram::Subtomogram;
use crate::model::transform::CoordinateTransformation;
use crate::project::{project_root_for, validate_store_path};
use crate::reader::{Filter, RawRecord, RecordReader};
use crate::schema::{map_classes_table, CLASSES_TBL, OBJECTS_TBL};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Converts the subtomogram rows belonging to one tomogram at a time.
pub struct SubtomogramConverter<'meta> {
    store_path: PathBuf,
    project_root: PathBuf,
    image_meta: &'meta dyn ImageMeta,
    options: ConvertOptions,
}

impl<'meta> SubtomogramConverter<'meta> {
    pub fn new(
        store_path: impl AsRef<Path>,
        image_meta: &'meta dyn ImageMeta,
    ) -> ConvertResult<Self> {
        let store_path = validate_store_path(store_path)?;
        let project_root = project_root_for(&store_path);
        Ok(Self {
            store_path,
            project_root,
            image_meta,
            options: ConvertOptions::default(),
        })
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads the subtomograms extracted from the given tomogram.
    ///
    /// No matching rows is not an error; the result is an empty set.
    pub fn convert_for(&self, tomo_id: &str) -> ConvertResult<Vec<Subtomogram>> {
        let conn = open_store(&self.store_path)?;
        let schema = map_classes_table(&conn, CLASSES_TBL)?;

        let mut reader = RecordReader::prepare(
            &conn,
            OBJECTS_TBL,
            &schema,
            SUBTOMO_FIELDS,
            Some(Filter::equals(TOMO_ID, tomo_id.to_string())),
        )?;
        let mut rows = reader.query()?;

        let mut subtomograms = Vec::new();
        while let Some(record) = rows.next_record()? {
            match self.subtomogram_from_record(&record) {
                Ok(subtomogram) => subtomograms.push(subtomogram),
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
            "event=subtomograms module=convert status=ok tomo_id={tomo_id} subtomograms={}",
            subtomograms.len()
        );
        Ok(subtomograms)
    }

    fn subtomogram_from_record(&self, record: &RawRecord) -> ConvertResult<Subtomogram> {
        let path = resolve_project_path(&self.project_root, record.text(FILE_NAME));
        let info = path
            .as_deref()
            .and_then(|p| self.image_meta.image_info(Path::new(p)));

        // Coordinate orientation first, own refinement second.
        let mut transforms = Vec::new();
        if let Some(literal) = record.text(SUBTOMO_COORD_MATRIX) {
            let matrix = parse_matrix_literal(literal)?;
            transforms.push(CoordinateTransformation::Affine(orientation_block(
                &matrix,
                OrientationKind::Coordinate,
            )?));
        }
        if let Some(literal) = record.text(TRANSFORMATION_MATRIX) {
            let matrix = parse_matrix_literal(literal)?;
            transforms.push(CoordinateTransformation::Affine(orientation_block(
                &matrix,
                OrientationKind::Subtomogram,
            )?));
        }

        Ok(Subtomogram {
            path,
            position: [
                record.real(SUBTOMO_X),
                record.real(SUBTOMO_Y),
                record.real(SUBTOMO_Z),
            ],
            width: info.map(|i| i.size_x),
            height: info.map(|i| i.size_y),
            depth: info.map(|i| i.size_z),
            coordinate_transformations: transforms,
        })
    }
}
