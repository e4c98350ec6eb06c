//! `copy` subcommand: load from one location, save to another.

use crate::cli::{EXIT_FAILURE, EXIT_OK};
use crate::io::{self, RouterRegistry};

/// Run `copy <source> <destination>`.
pub async fn run(registry: &RouterRegistry, source: &str, destination: &str) -> i32 {
    match io::copy_model(registry, source, destination).await {
        Ok(result) => {
            let info = result.model_artifacts_info;
            println!(
                "Copied {} -> {} ({} topology, {} weight bytes, saved {})",
                source,
                destination,
                info.model_topology_type,
                info.weight_data_bytes.unwrap_or(0),
                info.date_saved.to_rfc3339()
            );
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Copy failed: {}", e);
            EXIT_FAILURE
        }
    }
}
