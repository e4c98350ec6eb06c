//! Storage handler error types.
//!
//! Every failure surfaces through the returned `Result`; no handler reports
//! partial success.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by storage handlers and routers.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("Path conflict: {} exists as a file, not a directory", path.display())]
    PathConflict { path: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model manifest at {location}: {reason}")]
    ManifestParse { location: String, reason: String },

    #[error("Failed to read weight shard {}: {source}", path.display())]
    ShardRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Manifest at {location} contains neither modelTopology nor weightsManifest")]
    EmptyManifest { location: String },

    #[error("Request config conflict: {0}")]
    ConfigConflict(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("No handler found for location: {0}")]
    UnresolvedLocation(String),

    #[error("Invalid handler configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    #[error("Weight data is {actual} bytes but weight specs require {expected} bytes")]
    WeightDataMismatch { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl IoError {
    /// Returns true if retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns true if the failure stems from caller input rather than I/O.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::PathConflict { .. }
                | Self::ConfigConflict(_)
                | Self::InvalidConfig(_)
                | Self::UnresolvedLocation(_)
                | Self::WeightDataMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_conflict_message_names_path() {
        let err = IoError::PathConflict { path: PathBuf::from("/tmp/dest") };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/dest"));
        assert!(msg.contains("exists as a file"));
        assert!(msg.contains("directory"));
    }

    #[test]
    fn test_write_message_names_path() {
        let err = IoError::Write {
            path: PathBuf::from("/tmp/dest/weights.bin"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/dest/weights.bin"));
        assert!(msg.contains("denied"));
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_empty_manifest_message_names_fields() {
        let err = IoError::EmptyManifest { location: "http://h/model.json".into() };
        let msg = err.to_string();
        assert!(msg.contains("modelTopology"));
        assert!(msg.contains("weightsManifest"));
    }

    #[test]
    fn test_classification() {
        let transport = IoError::Transport { url: "u".into(), reason: "r".into() };
        assert!(transport.is_transient());
        assert!(!transport.is_caller_error());

        let conflict = IoError::ConfigConflict("body".into());
        assert!(conflict.is_caller_error());
        assert!(!conflict.is_transient());
    }
}
