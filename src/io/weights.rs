//! Weight manifest flattening and shard assembly.
//!
//! Byte offsets are never stored: a weight's bytes are located purely by its
//! position in manifest order. Every function here walks groups in sequence,
//! then paths/weights within a group in sequence.

use std::collections::HashSet;

use super::error::IoError;
use super::types::{WeightsManifestEntry, WeightsManifestGroup};

/// All weight specs across groups, in manifest order.
pub fn flatten_weight_specs(manifest: &[WeightsManifestGroup]) -> Vec<WeightsManifestEntry> {
    manifest
        .iter()
        .flat_map(|group| group.weights.iter().cloned())
        .collect()
}

/// All shard paths across groups, in manifest order.
pub fn shard_paths(manifest: &[WeightsManifestGroup]) -> Vec<&str> {
    manifest
        .iter()
        .flat_map(|group| group.paths.iter().map(String::as_str))
        .collect()
}

/// Concatenate shard buffers in the given order into one contiguous buffer.
pub fn concatenate_buffers<B: AsRef<[u8]>>(buffers: &[B]) -> Vec<u8> {
    let total: usize = buffers.iter().map(|b| b.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);
    for buffer in buffers {
        out.extend_from_slice(buffer.as_ref());
    }
    out
}

/// Sum of byte lengths implied by `specs`. None if any dtype is
/// variable-width.
pub fn expected_byte_len(specs: &[WeightsManifestEntry]) -> Option<usize> {
    specs.iter().try_fold(0usize, |total, spec| {
        spec.byte_len().map(|len| total.saturating_add(len))
    })
}

/// Loaded weight fields for a manifest that lists shards.
///
/// A manifest whose groups hold no weights and whose shards are empty
/// describes a topology-only model, so both fields come back as `None`.
pub fn loaded_weights(
    specs: Vec<WeightsManifestEntry>,
    data: Vec<u8>,
) -> (Option<Vec<WeightsManifestEntry>>, Option<Vec<u8>>) {
    if specs.is_empty() && data.is_empty() {
        (None, None)
    } else {
        (Some(specs), Some(data))
    }
}

/// Reject manifests that reuse a weight name.
pub fn check_unique_names(specs: &[WeightsManifestEntry], location: &str) -> Result<(), IoError> {
    let mut seen = HashSet::with_capacity(specs.len());
    for spec in specs {
        if !seen.insert(spec.name.as_str()) {
            return Err(IoError::ManifestParse {
                location: location.to_string(),
                reason: format!("duplicate weight name '{}'", spec.name),
            });
        }
    }
    Ok(())
}
