//! Filesystem storage handler.
//!
//! Save writes a fixed two-file layout into a directory:
//!
//! ```text
//! <dir>/model.json    manifest (topology + single-group weights manifest)
//! <dir>/weights.bin   raw weight bytes in weight-spec order
//! ```
//!
//! Load takes the path of a manifest file and accepts any number of groups
//! and shard files, resolved relative to the manifest's directory.

use std::path::{Component, Path, PathBuf};

use futures::future::try_join_all;
use tracing::Instrument;

use super::error::IoError;
use super::handler::IoHandler;
use super::types::{
    ModelArtifacts, ModelArtifactsInfo, ModelJson, ModelTopology, SaveResult,
    WeightsManifestGroup,
};
use super::weights;
use crate::telemetry::{IoSpan, SpanExt};

/// Manifest file name written by `save`.
pub const MODEL_JSON_FILENAME: &str = "model.json";

/// Weight shard file name written by `save`.
pub const WEIGHTS_BINARY_FILENAME: &str = "weights.bin";

/// Location prefix claimed by the filesystem router.
pub const FILE_SCHEME: &str = "file://";

/// Reads and writes model artifacts on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSystemHandler {
    path: PathBuf,
    location: String,
}

impl FileSystemHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let location = path.display().to_string();
        Self { path, location }
    }

    /// Build from a location string, stripping a leading `file://`.
    pub fn from_location(location: &str) -> Self {
        let path = location.strip_prefix(FILE_SCHEME).unwrap_or(location);
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the destination is a directory, creating it if absent.
    ///
    /// A regular file at the destination, or at any ancestor that would
    /// have to become a directory, is a `PathConflict` naming that file.
    async fn prepare_directory(&self) -> Result<(), IoError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(IoError::PathConflict {
                path: self.path.clone(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Err(source) = tokio::fs::create_dir_all(&self.path).await {
                    return Err(self.creation_error(source).await);
                }
                tracing::debug!(path = %self.location, "created save directory");
                Ok(())
            }
            Err(source) => Err(IoError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Classify a failed `create_dir_all`: a non-directory somewhere on the
    /// path is a conflict, anything else a write failure.
    async fn creation_error(&self, source: std::io::Error) -> IoError {
        for ancestor in self.path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            if let Ok(meta) = tokio::fs::metadata(ancestor).await {
                if !meta.is_dir() {
                    return IoError::PathConflict {
                        path: ancestor.to_path_buf(),
                    };
                }
                break;
            }
        }
        IoError::Write {
            path: self.path.clone(),
            source,
        }
    }

    async fn write_file(&self, name: &str, contents: &[u8]) -> Result<(), IoError> {
        let path = self.path.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| IoError::Write { path, source })
    }

    async fn save_artifacts(&self, artifacts: &ModelArtifacts) -> Result<SaveResult, IoError> {
        let model_topology = match &artifacts.model_topology {
            Some(ModelTopology::GraphDef(_)) => {
                return Err(IoError::NotImplemented(
                    "filesystem save of a binary GraphDef topology".into(),
                ))
            }
            Some(ModelTopology::Json(value)) => Some(value.clone()),
            None => None,
        };
        artifacts.validate()?;

        self.prepare_directory().await?;

        let manifest = ModelJson {
            model_topology,
            weights_manifest: Some(vec![WeightsManifestGroup {
                paths: vec![WEIGHTS_BINARY_FILENAME.to_string()],
                weights: artifacts.weight_specs.clone().unwrap_or_default(),
            }]),
            format: artifacts.format.clone(),
            generated_by: artifacts.generated_by.clone(),
            converted_by: artifacts.converted_by.clone(),
        };
        let manifest_bytes = serde_json::to_vec(&manifest)
            .map_err(|e| IoError::Serialization(format!("model.json: {}", e)))?;

        let weight_data = artifacts.weight_data.as_deref().unwrap_or(&[]);
        self.write_file(WEIGHTS_BINARY_FILENAME, weight_data).await?;
        self.write_file(MODEL_JSON_FILENAME, &manifest_bytes).await?;

        tracing::info!(
            path = %self.location,
            weight_bytes = weight_data.len(),
            "saved model artifacts"
        );
        tracing::Span::current().record("bytes", weight_data.len());

        Ok(SaveResult {
            model_artifacts_info: ModelArtifactsInfo::describe(artifacts),
        })
    }

    async fn read_manifest(&self) -> Result<ModelJson, IoError> {
        let manifest_error = |reason: String| IoError::ManifestParse {
            location: self.location.clone(),
            reason,
        };

        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| manifest_error(format!("cannot read manifest: {}", e)))?;
        if meta.is_dir() {
            return Err(manifest_error(format!(
                "path is a directory; expected the {} manifest file",
                MODEL_JSON_FILENAME
            )));
        }

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| manifest_error(format!("cannot read manifest: {}", e)))?;
        let manifest = ModelJson::from_slice(&bytes, &self.location)?;

        if manifest.model_topology.is_none() && manifest.weights_manifest.is_none() {
            return Err(manifest_error(
                "missing weightsManifest field (and no modelTopology)".into(),
            ));
        }
        Ok(manifest)
    }

    /// Read every shard listed by `manifest` and concatenate in manifest order.
    async fn read_shards(&self, manifest: &[WeightsManifestGroup]) -> Result<Vec<u8>, IoError> {
        let base = self.path.parent().unwrap_or_else(|| Path::new(""));
        let mut shard_files = Vec::new();
        for relative in weights::shard_paths(manifest) {
            shard_files.push(resolve_shard_path(base, relative, &self.location)?);
        }

        let reads = shard_files.into_iter().map(|path| async move {
            tracing::debug!(shard = %path.display(), "reading weight shard");
            tokio::fs::read(&path)
                .await
                .map_err(|source| IoError::ShardRead { path, source })
        });
        let buffers = try_join_all(reads).await?;

        Ok(weights::concatenate_buffers(&buffers))
    }

    async fn load_artifacts(&self) -> Result<ModelArtifacts, IoError> {
        let manifest = self.read_manifest().await?;

        let (weight_specs, weight_data) = match &manifest.weights_manifest {
            Some(groups) => {
                let specs = weights::flatten_weight_specs(groups);
                weights::check_unique_names(&specs, &self.location)?;
                let data = self.read_shards(groups).await?;
                warn_on_size_mismatch(&specs, data.len(), &self.location);
                weights::loaded_weights(specs, data)
            }
            None => (None, None),
        };

        let weight_bytes = weight_data.as_ref().map_or(0, Vec::len);
        tracing::info!(path = %self.location, weight_bytes, "loaded model artifacts");
        tracing::Span::current().record("bytes", weight_bytes);

        Ok(ModelArtifacts {
            model_topology: manifest.model_topology.map(ModelTopology::Json),
            weight_specs,
            weight_data,
            format: manifest.format,
            generated_by: manifest.generated_by,
            converted_by: manifest.converted_by,
        })
    }
}

#[async_trait::async_trait]
impl IoHandler for FileSystemHandler {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn location(&self) -> &str {
        &self.location
    }

    async fn save(&self, artifacts: &ModelArtifacts) -> Result<SaveResult, IoError> {
        let span = IoSpan::new("save", self.kind(), &self.location);
        let result = self.save_artifacts(artifacts).instrument(span.clone()).await;
        span.record_result(&result);
        result
    }

    async fn load(&self) -> Result<ModelArtifacts, IoError> {
        let span = IoSpan::new("load", self.kind(), &self.location);
        let result = self.load_artifacts().instrument(span.clone()).await;
        span.record_result(&result);
        result
    }
}

/// Join a manifest-relative shard path onto `base`, refusing paths that
/// escape the manifest directory.
fn resolve_shard_path(base: &Path, relative: &str, location: &str) -> Result<PathBuf, IoError> {
    let candidate = Path::new(relative);
    let escapes = candidate.components().any(|c| {
        matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
    });
    if relative.is_empty() || escapes {
        return Err(IoError::ManifestParse {
            location: location.to_string(),
            reason: format!("shard path '{}' must stay within the manifest directory", relative),
        });
    }
    Ok(base.join(candidate))
}

pub(crate) fn warn_on_size_mismatch(
    specs: &[super::types::WeightsManifestEntry],
    actual: usize,
    location: &str,
) {
    if let Some(expected) = weights::expected_byte_len(specs) {
        if expected != actual {
            tracing::warn!(
                location = %location,
                expected,
                actual,
                "weight data size does not match weight specs"
            );
        }
    }
}

/// Router for bare paths and `file://` locations.
///
/// Any other `scheme://` location is left for the next router.
pub fn file_system_router(location: &str) -> Option<Box<dyn IoHandler>> {
    if location.is_empty() {
        return None;
    }
    if location.starts_with(FILE_SCHEME) || !location.contains("://") {
        tracing::debug!(location, "file system router matched");
        return Some(Box::new(FileSystemHandler::from_location(location)));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_location_strips_scheme() {
        let handler = FileSystemHandler::from_location("file:///tmp/models/mnist");
        assert_eq!(handler.path(), Path::new("/tmp/models/mnist"));
    }

    #[test]
    fn test_router_matches_paths_and_file_scheme() {
        assert!(file_system_router("models/mnist").is_some());
        assert!(file_system_router("/abs/model.json").is_some());
        assert!(file_system_router("file://models/mnist").is_some());
        assert_eq!(
            file_system_router("file://a/b").map(|h| h.kind()),
            Some("file")
        );
    }

    #[test]
    fn test_router_rejects_other_schemes() {
        assert!(file_system_router("http://localhost/model.json").is_none());
        assert!(file_system_router("https://host/model.json").is_none());
        assert!(file_system_router("indexeddb://mnist").is_none());
        assert!(file_system_router("").is_none());
    }

    #[test]
    fn test_resolve_shard_path_rejects_escapes() {
        let base = Path::new("/models/a");
        assert_eq!(
            resolve_shard_path(base, "weights.bin", "m").unwrap(),
            PathBuf::from("/models/a/weights.bin")
        );
        assert!(resolve_shard_path(base, "sub/shard1.bin", "m").is_ok());
        assert!(resolve_shard_path(base, "../secret.bin", "m").is_err());
        assert!(resolve_shard_path(base, "/etc/passwd", "m").is_err());
        assert!(resolve_shard_path(base, "", "m").is_err());
    }
}
