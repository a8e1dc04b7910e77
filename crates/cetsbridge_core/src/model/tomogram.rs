//! Tomogram entity family: reconstructed volumes and their particle sets.

use crate::model::transform::{Affine, CoordinateTransformation};
use serde::{Deserialize, Serialize};

/// A picked 3D point inside a tomogram. Not an image: no path, no size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate3D {
    pub position: [Option<f64>; 3],
    /// Orientation angular block, when the source stores one.
    pub orientation: Option<Affine>,
}

/// An extracted and optionally refined subvolume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subtomogram {
    pub path: Option<String>,
    pub position: [Option<f64>; 3],
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub depth: Option<i64>,
    /// Fixed order: picking-coordinate orientation first, then the
    /// subtomogram's own refined alignment.
    pub coordinate_transformations: Vec<CoordinateTransformation>,
}

/// Particle collection attached to one tomogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleSet {
    Coordinates(Vec<Coordinate3D>),
    Subtomograms(Vec<Subtomogram>),
}

impl ParticleSet {
    /// An empty set is valid: a tomogram with no matching particle rows.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Coordinates(items) => items.is_empty(),
            Self::Subtomograms(items) => items.is_empty(),
        }
    }
}

/// One reconstructed tomographic volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tomogram {
    pub tomo_id: Option<String>,
    pub path: Option<String>,
    pub even_path: Option<String>,
    pub odd_path: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub depth: Option<i64>,
    pub ctf_corrected: Option<bool>,
    /// Linked by shared tomogram identifier, when a particle store is
    /// supplied.
    pub particles: Option<ParticleSet>,
}
