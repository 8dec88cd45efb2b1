//! Snapshot adapter errors
//!
//! Adapter failures are translated to [`PortError`] at the port boundary so
//! the quote service never sees file-system or parser details.

use core_kernel::PortError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file does not exist
    #[error("Snapshot file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The snapshot file could not be read
    #[error("Failed to read snapshot file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot document is not valid
    #[error("Invalid snapshot document {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SnapshotError {
    /// Classifies an I/O failure for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            SnapshotError::NotFound(path)
        } else {
            SnapshotError::Io { path, source }
        }
    }
}

impl From<SnapshotError> for PortError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::NotFound(path) => PortError::not_found("snapshot file", path.display()),
            SnapshotError::Io { path, source } => {
                PortError::connection(format!("cannot read {}", path.display()), source)
            }
            parse @ SnapshotError::Parse { .. } => PortError::transformation(parse.to_string()),
        }
    }
}
