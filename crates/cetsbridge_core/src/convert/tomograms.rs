//! Tomogram assembly.
//!
//! Tomograms live in one flat master table, no per-tomogram sub-table.
//! When a particle source store is supplied, the matching particle
//! converter runs once per tomogram, filtered by its identifier, and the
//! result is attached as the tomogram's particle set (empty sets are
//! valid).

use crate::convert::fields::{CTF_CORRECTED, FILE_NAME, ODD_EVEN_FILE_NAMES, TOMOGRAM_FIELDS, TS_ID};
use crate::convert::{
    resolve_project_path, split_odd_even, ConvertError, ConvertOptions, ConvertResult,
    CoordinateConverter, SubtomogramConverter,
};
use crate::db::open_store;
use crate::image::ImageMeta;
use crate::model::tomogram::{ParticleSet, Tomogram};
use crate::project::{project_root_for, validate_store_path};
use crate::reader::RecordReader;
use crate::schema::{map_classes_table, CLASSES_TBL, OBJECTS_TBL};
use log::info;
use std::path::{Path, PathBuf};

/// Independently-located store holding the particles of this project.
#[derive(Debug, Clone)]
pub enum ParticleSource {
    Coordinates(PathBuf),
    Subtomograms(PathBuf),
}

enum ParticleReader<'meta> {
    Coordinates(CoordinateConverter),
    Subtomograms(SubtomogramConverter<'meta>),
}

/// Converts one tomogram store into normalized [`Tomogram`] entities.
pub struct TomogramConverter<'meta> {
    store_path: PathBuf,
    project_root: PathBuf,
    image_meta: &'meta dyn ImageMeta,
    options: ConvertOptions,
}

impl<'meta> TomogramConverter<'meta> {
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

    /// Converts every tomogram of the store, optionally attaching particle
    /// sets read from `particles`.
    pub fn convert(&self, particles: Option<&ParticleSource>) -> ConvertResult<Vec<Tomogram>> {
        let particle_reader = match particles {
            Some(ParticleSource::Coordinates(path)) => Some(ParticleReader::Coordinates(
                CoordinateConverter::new(path)?.with_options(self.options),
            )),
            Some(ParticleSource::Subtomograms(path)) => Some(ParticleReader::Subtomograms(
                SubtomogramConverter::new(path, self.image_meta)?.with_options(self.options),
            )),
            None => None,
        };

        let conn = open_store(&self.store_path)?;
        let schema = map_classes_table(&conn, CLASSES_TBL)?;

        let mut reader =
            RecordReader::prepare(&conn, OBJECTS_TBL, &schema, TOMOGRAM_FIELDS, None)?;
        let mut rows = reader.query()?;

        let mut tomograms = Vec::new();
        while let Some(record) = rows.next_record()? {
            let tomo_id = record.text(TS_ID).map(str::to_string);
            let path = resolve_project_path(&self.project_root, record.text(FILE_NAME));
            let dims = path
                .as_deref()
                .and_then(|p| self.image_meta.image_info(Path::new(p)));

            let (even_path, odd_path) = match record.text(ODD_EVEN_FILE_NAMES) {
                Some(joined) => split_odd_even(joined),
                None => (None, None),
            };

            let particle_set = match &particle_reader {
                Some(reader) => {
                    // Particle rows are selected by shared identifier, so a
                    // tomogram without one cannot be linked.
                    let id = tomo_id.as_deref().ok_or_else(|| ConvertError::MissingField {
                        table: OBJECTS_TBL.to_string(),
                        field: TS_ID,
                    })?;
                    Some(match reader {
                        ParticleReader::Coordinates(converter) => {
                            ParticleSet::Coordinates(converter.convert_for(id)?)
                        }
                        ParticleReader::Subtomograms(converter) => {
                            ParticleSet::Subtomograms(converter.convert_for(id)?)
                        }
                    })
                }
                None => None,
            };

            tomograms.push(Tomogram {
                tomo_id,
                path,
                even_path,
                odd_path,
                width: dims.map(|i| i.size_x),
                height: dims.map(|i| i.size_y),
                depth: dims.map(|i| i.size_z),
                ctf_corrected: record.boolean(CTF_CORRECTED),
                particles: particle_set,
            });
        }

        info!(
            "event=tomograms module=convert status=ok tomograms={}",
            tomograms.len()
        );
        Ok(tomograms)
    }
}
