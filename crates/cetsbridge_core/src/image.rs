//! Image-metadata collaborator seam.
//!
//! The conversion consumes width/height/depth of referenced image files as
//! an opaque call. Dimensions are optional data in the output model, so a
//! provider that cannot answer returns `None` and the entity is assembled
//! with absent dimensions.

use std::path::Path;

/// Dimensions read from an image or volume header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub size_x: i64,
    pub size_y: i64,
    pub size_z: i64,
}

/// Provider of image-header dimensions.
pub trait ImageMeta {
    /// Returns the dimensions of the file at `path`, or `None` when the
    /// file is unavailable or not a recognized image.
    fn image_info(&self, path: &Path) -> Option<ImageInfo>;
}

/// Provider for metadata-only conversions: every lookup is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingImageMeta;

impl ImageMeta for MissingImageMeta {
    fn image_info(&self, _path: &Path) -> Option<ImageInfo> {
        None
    }
}
