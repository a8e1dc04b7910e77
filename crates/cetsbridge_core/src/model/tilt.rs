//! Tilt-series entity family.
//!
//! # Invariants
//! - A `TiltSeries` owns its images in the order they were read from the
//!   per-series table.
//! - A `TiltImage` optionally carries one CTF record, linked by positional
//!   index within its parent series.

use crate::model::transform::CoordinateTransformation;
use serde::{Deserialize, Serialize};

/// One defocus/CTF estimation record.
///
/// Every field is optional: older stores omit phase shift, and a scope may
/// not carry some estimations at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CtfRecord {
    pub defocus_u: Option<f64>,
    pub defocus_v: Option<f64>,
    pub defocus_angle: Option<f64>,
    pub phase_shift: Option<f64>,
    pub acquisition_order: Option<i64>,
}

/// One projection image of a tilt series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TiltImage {
    /// Identifier of the owning tilt series.
    pub ts_id: Option<String>,
    /// Project-root-resolved image path; absent when the source row carries
    /// no filename.
    pub path: Option<String>,
    /// Even-frames companion, from the sorted odd/even filename pair.
    pub even_path: Option<String>,
    /// Odd-frames companion, from the sorted odd/even filename pair.
    pub odd_path: Option<String>,
    pub acquisition_order: Option<i64>,
    /// Slice index of this image within the stack file.
    pub section: Option<i64>,
    pub nominal_tilt_angle: Option<f64>,
    pub accumulated_dose: Option<f64>,
    /// Pixel width from the image header collaborator.
    pub width: Option<i64>,
    /// Pixel height from the image header collaborator.
    pub height: Option<i64>,
    /// CTF record attached by positional index within the parent series.
    pub ctf: Option<CtfRecord>,
    /// Reconstructed alignment: stored translation first, then rotation.
    pub coordinate_transformations: Vec<CoordinateTransformation>,
}

/// An ordered tilt series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TiltSeries {
    pub ts_id: String,
    /// Stack path; taken from the last image of the series.
    pub path: Option<String>,
    pub ctf_corrected: Option<bool>,
    pub images: Vec<TiltImage>,
}
