//! Model artifact storage.
//!
//! Handlers persist and reconstruct `ModelArtifacts` (topology, weight specs,
//! flat weight buffer). Routers map a location string to a handler.

pub mod error;
pub mod file_system;
pub mod http;
pub mod types;
pub mod weights;

mod handler;
mod management;
mod router;

pub use error::IoError;
pub use file_system::{file_system_router, FileSystemHandler, MODEL_JSON_FILENAME, WEIGHTS_BINARY_FILENAME};
pub use handler::IoHandler;
pub use http::{Credentials, HttpContext, HttpHandler, HttpRouter, RequestConfig};
pub use management::{copy_model, load_model, save_model};
pub use router::{global, init_global, register_default_routers, Router, RouterRegistry};
pub use types::{
    DType, ModelArtifacts, ModelArtifactsInfo, ModelJson, ModelTopology, ModelTopologyType,
    Quantization, QuantizedDType, SaveResult, WeightsManifestConfig, WeightsManifestEntry,
    WeightsManifestGroup,
};
