//! Model artifact I/O.
//!
//! Persists and reconstructs trained models as a JSON manifest plus binary
//! weight shards, on the local filesystem or from an HTTP endpoint.
//!
//! # Layout
//!
//! - `io`: data model, storage handlers, router registry
//! - `environment`: execution-context capability consumed by the HTTP backend
//! - `config`: `ARTIFACT_IO_*` environment configuration
//! - `telemetry`: tracing subscriber setup and operation spans
//! - `cli`: subcommands behind the `artifact-io-cli` binary
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), artifact_io::io::IoError> {
//! let registry = artifact_io::io::global()?;
//! let artifacts = artifact_io::io::load_model(registry, "https://example.com/mnist/model.json").await?;
//! artifact_io::io::save_model(registry, "file://./mnist", &artifacts).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod io;
pub mod telemetry;

pub use environment::{Environment, ProcessEnvironment};
pub use io::{IoError, IoHandler, ModelArtifacts, RouterRegistry, SaveResult};
