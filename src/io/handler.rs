//! Storage handler capability shared by the filesystem and HTTP backends.

use super::error::IoError;
use super::types::{ModelArtifacts, SaveResult};

/// A model storage backend bound to one location.
///
/// Handlers hold only their construction-time location and config. No
/// locking is performed: concurrent `save` calls to one destination race and
/// leave whichever writer finished last.
#[async_trait::async_trait]
pub trait IoHandler: Send + Sync {
    /// Short backend name for logs (e.g. "file", "http").
    fn kind(&self) -> &'static str;

    /// The location this handler was constructed for.
    fn location(&self) -> &str;

    async fn save(&self, artifacts: &ModelArtifacts) -> Result<SaveResult, IoError>;

    async fn load(&self) -> Result<ModelArtifacts, IoError>;
}
