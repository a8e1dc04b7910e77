//! YAML rendering of the normalized entity graph.
//!
//! One file per top-level entity, named by entity kind and identifier.

use cetsbridge_core::{TiltSeries, Tomogram};
use log::info;
use std::error::Error;
use std::fs;
use std::path::Path;

pub fn write_tilt_series(out_dir: &Path, series_list: &[TiltSeries]) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(out_dir)?;
    for series in series_list {
        let file = out_dir.join(format!("tiltseries_{}.yaml", sanitize_id(&series.ts_id)));
        fs::write(&file, serde_yaml::to_string(series)?)?;
        info!(
            "event=yaml_write module=cli status=ok kind=tiltseries file={}",
            file.display()
        );
    }
    Ok(())
}

pub fn write_tomograms(out_dir: &Path, tomograms: &[Tomogram]) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(out_dir)?;
    for (index, tomogram) in tomograms.iter().enumerate() {
        let id = tomogram
            .tomo_id
            .as_deref()
            .map(sanitize_id)
            .unwrap_or_else(|| format!("{index}"));
        let file = out_dir.join(format!("tomogram_{id}.yaml"));
        fs::write(&file, serde_yaml::to_string(tomogram)?)?;
        info!(
            "event=yaml_write module=cli status=ok kind=tomogram file={}",
            file.display()
        );
    }
    Ok(())
}

/// Keeps identifiers filesystem-safe without losing their readability.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
