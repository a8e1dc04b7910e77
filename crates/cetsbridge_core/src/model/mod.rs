//! Normalized CETS-style entity model.
//!
//! # Responsibility
//! - Define the fixed output entities the conversion produces.
//!
//! # Invariants
//! - Entities are constructed once per source row and never mutated after
//!   being returned to the caller.
//! - Optional fields model data the source schema may simply not carry.

pub mod tilt;
pub mod tomogram;
pub mod transform;

pub use tilt::{CtfRecord, TiltImage, TiltSeries};
pub use tomogram::{Coordinate3D, ParticleSet, Subtomogram, Tomogram};
pub use transform::{Affine, CoordinateTransformation, Translation};
