//! CTF series assembly.
//!
//! # Responsibility
//! - Read every index-keyed CTF sub-table and key its record list by the
//!   tilt-series id enumerated at the same master-row position.
//!
//! # Invariants
//! - The ts_id comes from a different table than the one the sub-table is
//!   numbered against; correctness rests entirely on enumeration-order
//!   equality, an external contract with the producing application.
//! - The sub-table census (count of `id*_Objects` tables vs. enumerated
//!   series) is checked explicitly; a mismatch is fatal.

use crate::convert::fields::{
    ACQUISITION_ORDER, CTF_SERIES_FIELDS, DEFOCUS_ANGLE, DEFOCUS_U, DEFOCUS_V, PHASE_SHIFT,
    TS_ID,
};
use crate::convert::{ConvertError, ConvertResult};
use crate::db::{count_tables_matching, open_store};
use crate::model::tilt::CtfRecord;
use crate::project::validate_store_path;
use crate::reader::RecordReader;
use crate::schema::{locate, map_classes_table, ScopeKey, CLASSES_TBL, OBJECTS_TBL};
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// CTF record lists keyed by tilt-series id, in master enumeration order.
pub type CtfBySeries = BTreeMap<String, Vec<CtfRecord>>;

/// Converts one CTF store into per-series record lists.
pub struct CtfConverter {
    store_path: PathBuf,
}

impl CtfConverter {
    pub fn new(store_path: impl AsRef<Path>) -> ConvertResult<Self> {
        let store_path = validate_store_path(store_path)?;
        Ok(Self { store_path })
    }

    /// Reads every CTF series of the store.
    ///
    /// # Errors
    /// - [`ConvertError::CtfCountMismatch`] when the number of
    ///   `id{i}_Objects` sub-tables differs from the number of series rows
    ///   in the master table.
    pub fn convert(&self) -> ConvertResult<CtfBySeries> {
        let conn = open_store(&self.store_path)?;
        let master_schema = map_classes_table(&conn, CLASSES_TBL)?;

        let master_rows =
            RecordReader::prepare(&conn, OBJECTS_TBL, &master_schema, &[TS_ID], None)?
                .read_all()?;

        let mut ts_ids = Vec::with_capacity(master_rows.len());
        for record in &master_rows {
            let ts_id = record
                .text(TS_ID)
                .ok_or_else(|| ConvertError::MissingField {
                    table: OBJECTS_TBL.to_string(),
                    field: TS_ID,
                })?
                .to_string();
            ts_ids.push(ts_id);
        }

        let table_count = count_tables_matching(&conn, "id*_Objects")?;
        if table_count != ts_ids.len() {
            return Err(ConvertError::CtfCountMismatch {
                series: ts_ids.len(),
                tables: table_count,
            });
        }
        if ts_ids.is_empty() {
            return Ok(CtfBySeries::new());
        }

        // Index-keyed scopes share one schema; resolved from position 1.
        let first_scope = locate(&ScopeKey::IndexKeyed(1));
        let ctf_schema = map_classes_table(&conn, &first_scope.classes)?;

        let mut by_series = CtfBySeries::new();
        for (position, ts_id) in ts_ids.iter().enumerate() {
            info!("event=ctf_series module=convert status=start ts_id={ts_id}");
            let scope = locate(&ScopeKey::IndexKeyed(position + 1));

            let mut reader =
                RecordReader::prepare(&conn, &scope.objects, &ctf_schema, CTF_SERIES_FIELDS, None)?;
            let mut rows = reader.query()?;

            let mut records = Vec::new();
            while let Some(record) = rows.next_record()? {
                records.push(CtfRecord {
                    defocus_u: record.real(DEFOCUS_U),
                    defocus_v: record.real(DEFOCUS_V),
                    defocus_angle: record.real(DEFOCUS_ANGLE),
                    phase_shift: record.real(PHASE_SHIFT),
                    acquisition_order: record.integer(ACQUISITION_ORDER),
                });
            }

            info!(
                "event=ctf_series module=convert status=ok ts_id={ts_id} records={}",
                records.len()
            );
            by_series.insert(ts_id.clone(), records);
        }

        Ok(by_series)
    }
}
