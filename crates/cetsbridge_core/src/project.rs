//! Store-path validation and project-root discovery.
//!
//! # Responsibility
//! - Validate a source store path before any schema resolution happens.
//! - Derive the Scipion project root from a store's location on disk.
//!
//! # Invariants
//! - Validation runs exactly once per conversion call, before the store is
//!   opened.
//! - Root discovery is purely lexical after canonicalization; it never
//!   creates or probes directories.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension carried by every Scipion metadata store.
pub const STORE_EXTENSION: &str = "sqlite";

#[derive(Debug)]
pub enum StorePathError {
    Missing(PathBuf),
    NotAFile(PathBuf),
    NotReadable(PathBuf),
    WrongExtension { path: PathBuf, expected: &'static str },
}

impl Display for StorePathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "store does not exist: {}", path.display()),
            Self::NotAFile(path) => {
                write!(f, "store must be a regular file: {}", path.display())
            }
            Self::NotReadable(path) => {
                write!(f, "no read permission for store: {}", path.display())
            }
            Self::WrongExtension { path, expected } => write!(
                f,
                "invalid store extension for {}; expected `.{expected}`",
                path.display()
            ),
        }
    }
}

impl Error for StorePathError {}

/// Validates a source store path and returns its canonical form.
///
/// # Contract
/// - The path must exist, be a regular file, be readable, and carry the
///   `.sqlite` extension.
/// - Runs before any connection is opened; failure is fatal to the call.
pub fn validate_store_path(path: impl AsRef<Path>) -> Result<PathBuf, StorePathError> {
    let path = path.as_ref();
    let canonical = fs::canonicalize(path).map_err(|_| StorePathError::Missing(path.to_path_buf()))?;

    let metadata =
        fs::metadata(&canonical).map_err(|_| StorePathError::Missing(canonical.clone()))?;
    if !metadata.is_file() {
        return Err(StorePathError::NotAFile(canonical));
    }

    if fs::File::open(&canonical).is_err() {
        return Err(StorePathError::NotReadable(canonical));
    }

    match canonical.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext == STORE_EXTENSION => Ok(canonical),
        _ => Err(StorePathError::WrongExtension {
            path: canonical,
            expected: STORE_EXTENSION,
        }),
    }
}

/// Derives the project root for a validated store path.
///
/// Stores live at `<root>/Runs/<protocol>/<file>.sqlite`, so the root is the
/// store's grandparent-of-parent, resolved lexically.
pub fn project_root_for(store_path: &Path) -> PathBuf {
    let mut root = store_path.to_path_buf();
    // store file -> protocol dir -> Runs -> project root
    for _ in 0..3 {
        if !root.pop() {
            break;
        }
    }
    root
}
