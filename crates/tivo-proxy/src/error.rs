//! Error types for the proxy

use std::path::PathBuf;

use thiserror::Error;
use tivo_protocol::DeviceError;

/// Errors reading or writing the channel snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not a JSON list of channel records
    #[error("malformed channel snapshot {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that prevent the served object from starting
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The live channel fetch failed
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}
