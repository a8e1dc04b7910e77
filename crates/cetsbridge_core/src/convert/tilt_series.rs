//! Tilt-series assembly.
//!
//! # Responsibility
//! - Enumerate tilt-series ids from the master table, read each series'
//!   id-keyed image sub-table, decompose alignment matrices (planar
//!   variant), merge image dimensions, and attach CTF records by position.
//!
//! # Invariants
//! - The per-series image schema is resolved once, from the first series'
//!   classes table, and reused for every series of the store.
//! - CTF attachment correlates two order-stable scoped enumerations by
//!   position; it is not an identifier join, because the source provides
//!   none.

use crate::convert::ctf::CtfBySeries;
use crate::convert::fields::{
    ACCUMULATED_DOSE, ACQUISITION_ORDER, CTF_CORRECTED, FILE_NAME, ODD_EVEN_FILE_NAMES,
    SECTION_INDEX, TILT_ANGLE, TILT_IMAGE_FIELDS, TRANSFORMATION_MATRIX, TS_ID,
};
use crate::convert::{
    resolve_project_path, split_odd_even, ConvertError, ConvertOptions, ConvertResult,
    MatrixPolicy,
};
use crate::db::open_store;
use crate::geom::{parse_matrix_literal, planar_split};
use crate::image::ImageMeta;
use crate::model::tilt::{TiltImage, TiltSeries};
use crate::model::transform::CoordinateTransformation;
use crate::project::{project_root_for, validate_store_path};
use crate::reader::{RawRecord, RecordReader};
use crate::schema::{locate, map_classes_table, ScopeKey, CLASSES_TBL, OBJECTS_TBL};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Converts one tilt-series store into normalized [`TiltSeries`] entities.
pub struct TiltSeriesConverter<'meta> {
    store_path: PathBuf,
    project_root: PathBuf,
    image_meta: &'meta dyn ImageMeta,
    options: ConvertOptions,
}

impl<'meta> TiltSeriesConverter<'meta> {
    /// Validates the store path and derives the project root from it.
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

    /// Overrides the derived project root.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Converts every tilt series of the store.
    ///
    /// When `ctf` is supplied, each image at position *j* within its series
    /// receives element *j* of that series' record list; a series id absent
    /// from the mapping, or a position beyond the list, attaches nothing.
    pub fn convert(&self, ctf: Option<&CtfBySeries>) -> ConvertResult<Vec<TiltSeries>> {
        let conn = open_store(&self.store_path)?;
        let master_schema = map_classes_table(&conn, CLASSES_TBL)?;

        let master_rows = RecordReader::prepare(
            &conn,
            OBJECTS_TBL,
            &master_schema,
            &[TS_ID, CTF_CORRECTED],
            None,
        )?
        .read_all()?;

        let mut heads = Vec::with_capacity(master_rows.len());
        for record in &master_rows {
            let ts_id = record
                .text(TS_ID)
                .ok_or_else(|| ConvertError::MissingField {
                    table: OBJECTS_TBL.to_string(),
                    field: TS_ID,
                })?
                .to_string();
            heads.push((ts_id, record.boolean(CTF_CORRECTED)));
        }
        if heads.is_empty() {
            return Ok(Vec::new());
        }

        // One schema per store: every series shares the first one's layout.
        let first_scope = locate(&ScopeKey::IdKeyed(heads[0].0.clone()));
        let image_schema = map_classes_table(&conn, &first_scope.classes)?;

        let mut series_list = Vec::with_capacity(heads.len());
        for (ts_id, ctf_corrected) in &heads {
            info!("event=tilt_series module=convert status=start ts_id={ts_id}");
            let scope = locate(&ScopeKey::IdKeyed(ts_id.clone()));
            let ctf_records = ctf.and_then(|mapping| mapping.get(ts_id));

            let mut reader = RecordReader::prepare(
                &conn,
                &scope.objects,
                &image_schema,
                TILT_IMAGE_FIELDS,
                None,
            )?;
            let mut rows = reader.query()?;

            let mut images: Vec<TiltImage> = Vec::new();
            while let Some(record) = rows.next_record()? {
                match self.image_from_record(&record) {
                    Ok(mut image) => {
                        // Both sequences come from the same kind of scoped
                        // enumeration; position is the only available link.
                        image.ctf = ctf_records
                            .and_then(|records| records.get(images.len()))
                            .cloned();
                        images.push(image);
                    }
                    Err(ConvertError::Geometry(err))
                        if self.options.matrix_policy == MatrixPolicy::SkipRecord =>
                    {
                        warn!(
                            "event=record_skip module=convert ts_id={ts_id} reason=geometry error={err}"
                        );
                    }
                    Err(err) => return Err(err),
                }
            }

            if images.is_empty() {
                return Err(ConvertError::InvalidData(format!(
                    "tilt series `{ts_id}` has no images"
                )));
            }

            let path = images.last().and_then(|image| image.path.clone());
            info!(
                "event=tilt_series module=convert status=ok ts_id={ts_id} images={}",
                images.len()
            );
            series_list.push(TiltSeries {
                ts_id: ts_id.clone(),
                path,
                ctf_corrected: *ctf_corrected,
                images,
            });
        }

        Ok(series_list)
    }

    fn image_from_record(&self, record: &RawRecord) -> ConvertResult<TiltImage> {
        let path = resolve_project_path(&self.project_root, record.text(FILE_NAME));
        let info = path
            .as_deref()
            .and_then(|p| self.image_meta.image_info(Path::new(p)));

        let (even_path, odd_path) = match record.text(ODD_EVEN_FILE_NAMES) {
            Some(joined) => split_odd_even(joined),
            None => (None, None),
        };

        let mut transforms = Vec::new();
        if let Some(literal) = record.text(TRANSFORMATION_MATRIX) {
            let matrix = parse_matrix_literal(literal)?;
            let (translation, rotation) = planar_split(&matrix)?;
            transforms.push(CoordinateTransformation::Translation(translation));
            transforms.push(CoordinateTransformation::Affine(rotation));
        }

        Ok(TiltImage {
            ts_id: record.text(TS_ID).map(str::to_string),
            path,
            even_path,
            odd_path,
            acquisition_order: record.integer(ACQUISITION_ORDER),
            section: record.integer(SECTION_INDEX),
            nominal_tilt_angle: record.real(TILT_ANGLE),
            accumulated_dose: record.real(ACCUMULATED_DOSE),
            width: info.map(|i| i.size_x),
            height: info.map(|i| i.size_y),
            ctf: None,
            coordinate_transformations: transforms,
        })
    }
}
