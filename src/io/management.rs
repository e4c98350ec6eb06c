//! Location-level operations built on the router registry.

use super::error::IoError;
use super::router::RouterRegistry;
use super::types::{ModelArtifacts, SaveResult};

/// Load artifacts from whatever backend claims `location`.
pub async fn load_model(registry: &RouterRegistry, location: &str) -> Result<ModelArtifacts, IoError> {
    registry.load_handler(location)?.load().await
}

/// Save artifacts to whatever backend claims `location`.
pub async fn save_model(
    registry: &RouterRegistry,
    location: &str,
    artifacts: &ModelArtifacts,
) -> Result<SaveResult, IoError> {
    registry.save_handler(location)?.save(artifacts).await
}

/// Copy a model between locations, possibly across backends.
///
/// Both locations are resolved before any I/O, so an unroutable destination
/// fails without reading the source.
pub async fn copy_model(
    registry: &RouterRegistry,
    source: &str,
    destination: &str,
) -> Result<SaveResult, IoError> {
    let loader = registry.load_handler(source)?;
    let saver = registry.save_handler(destination)?;

    let artifacts = loader.load().await?;
    let result = saver.save(&artifacts).await?;

    tracing::info!(
        source = %loader.location(),
        destination = %saver.location(),
        "copied model"
    );
    Ok(result)
}
