//! Semantic field keys and per-family field lists.
//!
//! Keys follow the producing application's attribute naming (`_tsId`,
//! `_transform._matrix`, ...). They are stable logical names; the physical
//! column behind each one is discovered per scope via the schema map.

pub const TS_ID: &str = "_tsId";
pub const FILE_NAME: &str = "_filename";
pub const SECTION_INDEX: &str = "_index";
pub const ACQUISITION_ORDER: &str = "_acqOrder";
pub const TILT_ANGLE: &str = "_tiltAngle";
pub const ACCUMULATED_DOSE: &str = "_acquisition._accumDose";
pub const TRANSFORMATION_MATRIX: &str = "_transform._matrix";
pub const ODD_EVEN_FILE_NAMES: &str = "_oddEvenFileNames";
pub const CTF_CORRECTED: &str = "_ctfCorrected";

pub const TILT_IMAGE_FIELDS: &[&str] = &[
    TS_ID,
    FILE_NAME,
    SECTION_INDEX,
    ACQUISITION_ORDER,
    TILT_ANGLE,
    ACCUMULATED_DOSE,
    TRANSFORMATION_MATRIX,
    ODD_EVEN_FILE_NAMES,
];

pub const DEFOCUS_U: &str = "_defocusU";
pub const DEFOCUS_V: &str = "_defocusV";
pub const DEFOCUS_ANGLE: &str = "_defocusAngle";
pub const PHASE_SHIFT: &str = "_phaseShift";

pub const CTF_SERIES_FIELDS: &[&str] = &[
    DEFOCUS_U,
    DEFOCUS_V,
    DEFOCUS_ANGLE,
    PHASE_SHIFT,
    ACQUISITION_ORDER,
];

pub const TOMOGRAM_FIELDS: &[&str] = &[TS_ID, FILE_NAME, ODD_EVEN_FILE_NAMES, CTF_CORRECTED];

pub const TOMO_ID: &str = "_tomoId";
pub const COORD_X: &str = "_x";
pub const COORD_Y: &str = "_y";
pub const COORD_Z: &str = "_z";
pub const COORD_MATRIX: &str = "_eulerMatrix";

pub const COORDINATE_FIELDS: &[&str] = &[TOMO_ID, COORD_X, COORD_Y, COORD_Z, COORD_MATRIX];

pub const SUBTOMO_X: &str = "_coordinate._x";
pub const SUBTOMO_Y: &str = "_coordinate._y";
pub const SUBTOMO_Z: &str = "_coordinate._z";
pub const SUBTOMO_COORD_MATRIX: &str = "_coordinate._eulerMatrix";

pub const SUBTOMO_FIELDS: &[&str] = &[
    TOMO_ID,
    FILE_NAME,
    SUBTOMO_X,
    SUBTOMO_Y,
    SUBTOMO_Z,
    SUBTOMO_COORD_MATRIX,
    TRANSFORMATION_MATRIX,
];
