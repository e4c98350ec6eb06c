// Copyright 2024-2026 artifact-io Contributors
// SPDX-License-Identifier: Apache-2.0

//! `inspect` subcommand: load a model and summarize it.

use crate::cli::{EXIT_FAILURE, EXIT_OK};
use crate::io::{self, ModelArtifacts, ModelTopology, RouterRegistry};

/// Run `inspect <location>`.
///
/// Returns exit code: 0 on success, 1 if the model cannot be loaded.
pub async fn run(registry: &RouterRegistry, location: &str) -> i32 {
    match io::load_model(registry, location).await {
        Ok(artifacts) => {
            print!("{}", summarize(location, &artifacts));
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error loading {}: {}", location, e);
            EXIT_FAILURE
        }
    }
}

/// Human-readable summary of loaded artifacts.
pub fn summarize(location: &str, artifacts: &ModelArtifacts) -> String {
    let mut out = format!("Model: {}\n", location);

    let topology = match &artifacts.model_topology {
        Some(ModelTopology::Json(value)) => {
            let class = value
                .get("class_name")
                .and_then(|c| c.as_str())
                .unwrap_or("unknown");
            format!("JSON ({})", class)
        }
        Some(ModelTopology::GraphDef(bytes)) => format!("GraphDef ({} bytes)", bytes.len()),
        None => "none".to_string(),
    };
    out.push_str(&format!("Topology: {}\n", topology));

    if let Some(format) = &artifacts.format {
        out.push_str(&format!("Format: {}\n", format));
    }

    let specs = artifacts.weight_specs.as_deref().unwrap_or(&[]);
    out.push_str(&format!(
        "Weights: {} tensors, {} bytes\n",
        specs.len(),
        artifacts.weight_data_len()
    ));

    if !specs.is_empty() {
        out.push_str(&format!("{:<40} {:<10} {}\n", "NAME", "DTYPE", "SHAPE"));
        for spec in specs {
            out.push_str(&format!(
                "{:<40} {:<10} {:?}\n",
                spec.name,
                spec.dtype.as_str(),
                spec.shape
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{DType, WeightsManifestEntry};
    use serde_json::json;

    #[test]
    fn test_summarize_lists_weights() {
        let artifacts = ModelArtifacts {
            model_topology: Some(ModelTopology::Json(json!({"class_name": "Sequential"}))),
            weight_specs: Some(vec![
                WeightsManifestEntry::new("dense/kernel", vec![3, 1], DType::Float32),
                WeightsManifestEntry::new("dense/bias", vec![1], DType::Float32),
            ]),
            weight_data: Some(vec![0u8; 16]),
            ..Default::default()
        };
        let summary = summarize("m/model.json", &artifacts);
        assert!(summary.contains("Topology: JSON (Sequential)"));
        assert!(summary.contains("Weights: 2 tensors, 16 bytes"));
        assert!(summary.contains("dense/kernel"));
        assert!(summary.contains("[3, 1]"));
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize("x", &ModelArtifacts::default());
        assert!(summary.contains("Topology: none"));
        assert!(summary.contains("Weights: 0 tensors, 0 bytes"));
        assert!(!summary.contains("NAME"));
    }
}
