//! Model artifact data model.
//!
//! `ModelArtifacts` is the in-memory form of a trained model. `ModelJson` is
//! the manifest document written to `model.json` and served over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Element type of a weight tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Float32,
    Float16,
    Int32,
    Bool,
    String,
    Complex64,
}

impl DType {
    /// Bytes per element, or None for variable-width types.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            Self::Float32 | Self::Int32 => Some(4),
            Self::Float16 => Some(2),
            Self::Bool => Some(1),
            Self::Complex64 => Some(8),
            Self::String => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float16 => "float16",
            Self::Int32 => "int32",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Complex64 => "complex64",
        }
    }
}

/// Storage type of a quantized weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizedDType {
    Uint8,
    Uint16,
}

impl QuantizedDType {
    pub fn byte_width(&self) -> usize {
        match self {
            Self::Uint8 => 1,
            Self::Uint16 => 2,
        }
    }
}

/// Affine quantization parameters for a stored weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantization {
    pub scale: f64,
    pub min: f64,
    pub dtype: QuantizedDType,
}

/// Descriptor for one weight tensor. Names are unique within a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsManifestEntry {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: DType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization: Option<Quantization>,
}

impl WeightsManifestEntry {
    pub fn new(name: impl Into<String>, shape: Vec<usize>, dtype: DType) -> Self {
        Self {
            name: name.into(),
            shape,
            dtype,
            group: None,
            quantization: None,
        }
    }

    /// Number of elements implied by the shape. A scalar has one element.
    /// Saturates instead of overflowing on hostile shapes.
    pub fn element_count(&self) -> usize {
        self.shape.iter().fold(1usize, |acc, &dim| acc.saturating_mul(dim))
    }

    /// Stored byte length, or None when the dtype has no fixed width.
    pub fn byte_len(&self) -> Option<usize> {
        let width = match &self.quantization {
            Some(q) => q.dtype.byte_width(),
            None => self.dtype.byte_width()?,
        };
        Some(self.element_count().saturating_mul(width))
    }
}

/// A set of shard files and the weights packed across them, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsManifestGroup {
    pub paths: Vec<String>,
    pub weights: Vec<WeightsManifestEntry>,
}

/// Ordered groups; concatenated in sequence they form the full weight buffer.
pub type WeightsManifestConfig = Vec<WeightsManifestGroup>;

/// Model architecture description.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTopology {
    /// Structured document (e.g. a Keras model config).
    Json(serde_json::Value),
    /// Serialized binary graph.
    GraphDef(Vec<u8>),
}

impl ModelTopology {
    pub fn topology_type(&self) -> ModelTopologyType {
        match self {
            Self::Json(_) => ModelTopologyType::Json,
            Self::GraphDef(_) => ModelTopologyType::GraphDef,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::GraphDef(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelTopologyType {
    #[serde(rename = "JSON")]
    Json,
    GraphDef,
}

impl std::fmt::Display for ModelTopologyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::GraphDef => write!(f, "GraphDef"),
        }
    }
}

/// In-memory model: topology, weight specs, and the flat weight buffer.
///
/// `weight_data` holds every tensor's bytes concatenated in `weight_specs`
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelArtifacts {
    pub model_topology: Option<ModelTopology>,
    pub weight_specs: Option<Vec<WeightsManifestEntry>>,
    pub weight_data: Option<Vec<u8>>,
    pub format: Option<String>,
    pub generated_by: Option<String>,
    pub converted_by: Option<String>,
}

impl ModelArtifacts {
    /// Byte length implied by the weight specs. None if any spec has a
    /// variable-width dtype.
    pub fn expected_weight_bytes(&self) -> Option<usize> {
        match &self.weight_specs {
            Some(specs) => super::weights::expected_byte_len(specs),
            None => Some(0),
        }
    }

    pub fn weight_data_len(&self) -> usize {
        self.weight_data.as_ref().map_or(0, Vec::len)
    }

    /// Check that `weight_data` matches the specs. Absent or empty data is
    /// accepted.
    pub fn validate(&self) -> Result<(), super::IoError> {
        let actual = self.weight_data_len();
        if actual == 0 {
            return Ok(());
        }
        match self.expected_weight_bytes() {
            Some(expected) if expected != actual => {
                Err(super::IoError::WeightDataMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

/// The manifest document (`model.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_topology: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights_manifest: Option<WeightsManifestConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_by: Option<String>,
}

impl ModelJson {
    /// Parse a manifest document. `location` names the source in errors.
    pub fn from_slice(bytes: &[u8], location: &str) -> Result<Self, super::IoError> {
        serde_json::from_slice(bytes).map_err(|e| super::IoError::ManifestParse {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse and require at least one of `modelTopology`/`weightsManifest`.
    pub fn from_slice_non_empty(bytes: &[u8], location: &str) -> Result<Self, super::IoError> {
        let manifest = Self::from_slice(bytes, location)?;
        if manifest.model_topology.is_none() && manifest.weights_manifest.is_none() {
            return Err(super::IoError::EmptyManifest {
                location: location.to_string(),
            });
        }
        Ok(manifest)
    }
}

/// Summary of what a save produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifactsInfo {
    pub date_saved: DateTime<Utc>,
    pub model_topology_type: ModelTopologyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_topology_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_specs_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_data_bytes: Option<usize>,
}

impl ModelArtifactsInfo {
    /// Describe `artifacts`, stamped with the current time.
    pub fn describe(artifacts: &ModelArtifacts) -> Self {
        let (model_topology_type, model_topology_bytes) = match &artifacts.model_topology {
            Some(ModelTopology::Json(value)) => (ModelTopologyType::Json, Some(json_len(value))),
            Some(ModelTopology::GraphDef(bytes)) => (ModelTopologyType::GraphDef, Some(bytes.len())),
            None => (ModelTopologyType::Json, None),
        };
        let weight_specs_bytes = artifacts.weight_specs.as_ref().map(json_len);
        let weight_data_bytes = artifacts.weight_data.as_ref().map(Vec::len);

        Self {
            date_saved: Utc::now(),
            model_topology_type,
            model_topology_bytes,
            weight_specs_bytes,
            weight_data_bytes,
        }
    }
}

/// Result of a successful `save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub model_artifacts_info: ModelArtifactsInfo,
}

fn json_len<T: Serialize>(value: &T) -> usize {
    serde_json::to_vec(value).map_or(0, |v| v.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dtype_round_trips_lowercase() {
        let dtype: DType = serde_json::from_str("\"complex64\"").unwrap();
        assert_eq!(dtype, DType::Complex64);
        assert_eq!(serde_json::to_string(&DType::Float32).unwrap(), "\"float32\"");
    }

    #[test]
    fn test_unknown_dtype_rejected() {
        let result: Result<DType, _> = serde_json::from_str("\"float128\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_entry_byte_len() {
        let kernel = WeightsManifestEntry::new("dense/kernel", vec![3, 1], DType::Float32);
        assert_eq!(kernel.byte_len(), Some(12));

        let scalar = WeightsManifestEntry::new("step", vec![], DType::Int32);
        assert_eq!(scalar.byte_len(), Some(4));

        let text = WeightsManifestEntry::new("vocab", vec![10], DType::String);
        assert_eq!(text.byte_len(), None);
    }

    #[test]
    fn test_quantized_entry_uses_storage_width() {
        let mut entry = WeightsManifestEntry::new("w", vec![4, 4], DType::Float32);
        entry.quantization = Some(Quantization {
            scale: 0.1,
            min: -1.0,
            dtype: QuantizedDType::Uint8,
        });
        assert_eq!(entry.byte_len(), Some(16));
    }

    #[test]
    fn test_entry_omits_absent_optional_fields() {
        let entry = WeightsManifestEntry::new("dense/bias", vec![1], DType::Float32);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({"name": "dense/bias", "shape": [1], "dtype": "float32"}));
    }

    #[test]
    fn test_model_json_camel_case_fields() {
        let doc = json!({
            "modelTopology": {"class_name": "Sequential"},
            "weightsManifest": [{"paths": ["weights.bin"], "weights": []}],
            "generatedBy": "keras",
        });
        let manifest: ModelJson = serde_json::from_value(doc).unwrap();
        assert!(manifest.model_topology.is_some());
        assert_eq!(manifest.weights_manifest.unwrap()[0].paths, vec!["weights.bin"]);
        assert_eq!(manifest.generated_by.as_deref(), Some("keras"));
        assert!(manifest.converted_by.is_none());
    }

    #[test]
    fn test_from_slice_non_empty_rejects_empty_document() {
        let err = ModelJson::from_slice_non_empty(b"{\"format\": \"layers-model\"}", "mem://x")
            .unwrap_err();
        assert!(matches!(err, crate::io::IoError::EmptyManifest { .. }));
    }

    #[test]
    fn test_validate_detects_mismatch() {
        let artifacts = ModelArtifacts {
            weight_specs: Some(vec![WeightsManifestEntry::new("w", vec![2], DType::Float32)]),
            weight_data: Some(vec![0u8; 7]),
            ..Default::default()
        };
        let err = artifacts.validate().unwrap_err();
        assert!(matches!(
            err,
            crate::io::IoError::WeightDataMismatch { expected: 8, actual: 7 }
        ));
    }

    #[test]
    fn test_validate_accepts_empty_data() {
        let artifacts = ModelArtifacts {
            weight_specs: Some(vec![WeightsManifestEntry::new("w", vec![2], DType::Float32)]),
            weight_data: None,
            ..Default::default()
        };
        assert!(artifacts.validate().is_ok());
    }

    #[test]
    fn test_describe_counts_bytes() {
        let artifacts = ModelArtifacts {
            model_topology: Some(ModelTopology::Json(json!({"a": 1}))),
            weight_specs: Some(vec![]),
            weight_data: Some(vec![0u8; 16]),
            ..Default::default()
        };
        let info = ModelArtifactsInfo::describe(&artifacts);
        assert_eq!(info.model_topology_type, ModelTopologyType::Json);
        assert_eq!(info.model_topology_bytes, Some(7));
        assert_eq!(info.weight_specs_bytes, Some(2));
        assert_eq!(info.weight_data_bytes, Some(16));
    }

    #[test]
    fn test_topology_type_serializes_as_json_tag() {
        assert_eq!(serde_json::to_string(&ModelTopologyType::Json).unwrap(), "\"JSON\"");
        assert_eq!(ModelTopologyType::GraphDef.to_string(), "GraphDef");
    }
}
