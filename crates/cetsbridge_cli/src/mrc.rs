//! MRC v2014 header inspection.
//!
//! Implements the image-metadata collaborator over the MRC volume/stack
//! files a project references. Only the fixed 1024-byte header is read;
//! voxel data is never touched.
//!
//! # Invariants
//! - A file that is too short, lacks the `MAP ` tag, or declares
//!   non-positive dimensions reports no metadata rather than failing the
//!   conversion.

use cetsbridge_core::{ImageInfo, ImageMeta};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const HEADER_LEN: usize = 1024;
const MAP_TAG_OFFSET: usize = 208;
const MAP_TAG: &[u8; 4] = b"MAP ";

/// Image-metadata provider backed by MRC headers on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct MrcImageMeta;

impl ImageMeta for MrcImageMeta {
    fn image_info(&self, path: &Path) -> Option<ImageInfo> {
        match read_header_dims(path) {
            Some(info) => Some(info),
            None => {
                debug!(
                    "event=mrc_header module=cli status=absent path={}",
                    path.display()
                );
                None
            }
        }
    }
}

fn read_header_dims(path: &Path) -> Option<ImageInfo> {
    let mut header = [0u8; HEADER_LEN];
    let mut file = File::open(path).ok()?;
    file.read_exact(&mut header).ok()?;

    if &header[MAP_TAG_OFFSET..MAP_TAG_OFFSET + 4] != MAP_TAG {
        return None;
    }

    let size_x = i64::from(i32::from_le_bytes(header[0..4].try_into().ok()?));
    let size_y = i64::from(i32::from_le_bytes(header[4..8].try_into().ok()?));
    let size_z = i64::from(i32::from_le_bytes(header[8..12].try_into().ok()?));
    if size_x <= 0 || size_y <= 0 || size_z <= 0 {
        return None;
    }

    Some(ImageInfo {
        size_x,
        size_y,
        size_z,
    })
}

#[cfg(test)]
mod tests {
    use super::{MrcImageMeta, HEADER_LEN, MAP_TAG_OFFSET};
    use cetsbridge_core::ImageMeta;
    use std::fs;

    fn mrc_header(nx: i32, ny: i32, nz: i32, tagged: bool) -> Vec<u8> {
        let mut header = vec![0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&nx.to_le_bytes());
        header[4..8].copy_from_slice(&ny.to_le_bytes());
        header[8..12].copy_from_slice(&nz.to_le_bytes());
        if tagged {
            header[MAP_TAG_OFFSET..MAP_TAG_OFFSET + 4].copy_from_slice(b"MAP ");
        }
        header
    }

    #[test]
    fn reads_dimensions_from_tagged_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vol.mrc");
        fs::write(&path, mrc_header(960, 928, 300, true)).unwrap();

        let info = MrcImageMeta.image_info(&path).unwrap();
        assert_eq!((info.size_x, info.size_y, info.size_z), (960, 928, 300));
    }

    #[test]
    fn untagged_file_reports_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vol.mrc");
        fs::write(&path, mrc_header(960, 928, 300, false)).unwrap();
        assert!(MrcImageMeta.image_info(&path).is_none());
    }

    #[test]
    fn short_or_missing_file_reports_absent() {
        let dir = tempfile::tempdir().unwrap();
        let short = dir.path().join("short.mrc");
        fs::write(&short, b"MRC").unwrap();
        assert!(MrcImageMeta.image_info(&short).is_none());
        assert!(MrcImageMeta.image_info(&dir.path().join("gone.mrc")).is_none());
    }

    #[test]
    fn non_positive_dimensions_report_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vol.mrc");
        fs::write(&path, mrc_header(0, 928, 300, true)).unwrap();
        assert!(MrcImageMeta.image_info(&path).is_none());
    }
}
