//! Transformation-matrix parsing and decomposition.
//!
//! Matrix-valued columns hold the textual literal of a nested numeric list
//! (`[[1.0, 0.0, 5.0], ...]`), which is a JSON array of arrays. Two
//! decomposition conventions coexist and are intentionally asymmetric:
//!
//! - [`planar_split`] (tilt-image alignment): the matrix encodes a 2D
//!   in-plane shift plus rotation; translation and rotation are split out
//!   separately, with the rotation re-embedded as a homogeneous 3x3.
//! - [`orientation_block`] (3D particle orientation): the top-left 3x3
//!   angular block is taken verbatim; translation travels as an explicit
//!   position field on the entity, never inside this matrix.
//!
//! Malformed literals and wrong ranks fail with [`GeometryParseError`];
//! the caller decides record-skip vs abort, never this module.

use crate::model::transform::{Affine, Translation};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GeometryResult<T> = Result<T, GeometryParseError>;

#[derive(Debug)]
pub enum GeometryParseError {
    /// The literal is not a well-formed nested numeric list.
    Syntax(String),
    /// The parsed matrix is too small for the requested decomposition.
    Rank {
        required_rows: usize,
        required_cols: usize,
        rows: usize,
        cols: usize,
    },
}

impl Display for GeometryParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(detail) => write!(f, "malformed matrix literal: {detail}"),
            Self::Rank {
                required_rows,
                required_cols,
                rows,
                cols,
            } => write!(
                f,
                "matrix rank {rows}x{cols} below required {required_rows}x{required_cols}"
            ),
        }
    }
}

impl Error for GeometryParseError {}

/// Parses the textual nested-list literal of a numeric matrix.
///
/// # Errors
/// - [`GeometryParseError::Syntax`] on any parse failure or on ragged rows.
pub fn parse_matrix_literal(text: &str) -> GeometryResult<Vec<Vec<f64>>> {
    let matrix: Vec<Vec<f64>> = serde_json::from_str(text.trim())
        .map_err(|err| GeometryParseError::Syntax(err.to_string()))?;
    if matrix.is_empty() {
        return Err(GeometryParseError::Syntax("empty matrix".to_string()));
    }
    let width = matrix[0].len();
    if width == 0 || matrix.iter().any(|row| row.len() != width) {
        return Err(GeometryParseError::Syntax(
            "rows differ in length".to_string(),
        ));
    }
    Ok(matrix)
}

fn require_rank(matrix: &[Vec<f64>], rows: usize, cols: usize) -> GeometryResult<()> {
    let have_rows = matrix.len();
    let have_cols = matrix.first().map_or(0, Vec::len);
    if have_rows < rows || have_cols < cols {
        return Err(GeometryParseError::Rank {
            required_rows: rows,
            required_cols: cols,
            rows: have_rows,
            cols: have_cols,
        });
    }
    Ok(())
}

/// Variant A: splits a tilt-image alignment matrix into translation and
/// rotation components.
///
/// Only the top two rows' last column carry a shift; z is forced to 0
/// because the source only ever encodes 2D in-plane shifts here. The
/// rotation keeps rows 0 and 1 with their last element zeroed plus a
/// synthetic `(0, 0, 1)` row, so it carries no translation and stays a
/// valid homogeneous 2D rotation in 3x3 form.
pub fn planar_split(matrix: &[Vec<f64>]) -> GeometryResult<(Translation, Affine)> {
    require_rank(matrix, 3, 3)?;

    let translation = Translation {
        translation: [matrix[0][2], matrix[1][2], 0.0],
        name: "Scipion stored translation. Shifts in pixels.".to_string(),
        input: "Tilt-image".to_string(),
        output: "Tilt-image".to_string(),
    };

    let affine = Affine {
        affine: [
            [matrix[0][0], matrix[0][1], 0.0],
            [matrix[1][0], matrix[1][1], 0.0],
            [0.0, 0.0, 1.0],
        ],
        name: "Scipion stored rotation".to_string(),
        input: "Tilt-image".to_string(),
        output: "Tilt-image".to_string(),
    };

    Ok((translation, affine))
}

/// Selects the descriptive name of a Variant-B orientation transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationKind {
    /// Orientation picked with the particle's 3D coordinate.
    Coordinate,
    /// The subtomogram's own refined alignment.
    Subtomogram,
}

impl OrientationKind {
    fn name(self) -> &'static str {
        match self {
            Self::Coordinate => "Coordinate 3D orientation",
            Self::Subtomogram => "Subtomogram orientation",
        }
    }
}

/// Variant B: extracts the 3x3 angular block of a 3D orientation matrix.
///
/// The block is taken verbatim; any translation entries outside it are
/// ignored because position is supplied separately on the entity.
pub fn orientation_block(matrix: &[Vec<f64>], kind: OrientationKind) -> GeometryResult<Affine> {
    require_rank(matrix, 3, 3)?;

    let block = [
        [matrix[0][0], matrix[0][1], matrix[0][2]],
        [matrix[1][0], matrix[1][1], matrix[1][2]],
        [matrix[2][0], matrix[2][1], matrix[2][2]],
    ];

    Ok(Affine {
        affine: block,
        name: kind.name().to_string(),
        input: "Tomogram".to_string(),
        output: "Subtomogram".to_string(),
    })
}
