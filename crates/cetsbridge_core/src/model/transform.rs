//! Geometric transform components.

use serde::{Deserialize, Serialize};

/// Translation component with a descriptive name and named reference frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    /// Shift vector in pixels; z is 0 for in-plane tilt-image shifts.
    pub translation: [f64; 3],
    pub name: String,
    /// Input reference frame.
    pub input: String,
    /// Output reference frame.
    pub output: String,
}

/// 3x3 affine component (homogeneous 2D rotation or 3D angular block).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub affine: [[f64; 3]; 3],
    pub name: String,
    pub input: String,
    pub output: String,
}

/// One reconstructed coordinate transformation attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinateTransformation {
    Translation(Translation),
    Affine(Affine),
}
