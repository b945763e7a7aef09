//! Persisted channel lineup
//!
//! A flat JSON array of channel records, in the device's field layout. It
//! spares the startup channel search when present.

use std::path::Path;

use tivo_protocol::Channel;

use crate::error::SnapshotError;

/// Read a lineup snapshot
pub fn load_snapshot(path: &Path) -> Result<Vec<Channel>, SnapshotError> {
    let data = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&data).map_err(|source| SnapshotError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a lineup snapshot, creating parent directories as needed
pub fn save_snapshot(path: &Path, channels: &[Channel]) -> Result<(), SnapshotError> {
    let io_err = |source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string(channels).map_err(|source| SnapshotError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(path, json).map_err(io_err)
}
