//! Fuzz target for model.json manifest parsing.
//!
//! Arbitrary bytes must never panic the parser or the manifest walkers.

#![no_main]

use libfuzzer_sys::fuzz_target;
use artifact_io::io::weights::{expected_byte_len, flatten_weight_specs, shard_paths};
use artifact_io::io::ModelJson;

fuzz_target!(|data: &[u8]| {
    if let Ok(manifest) = ModelJson::from_slice(data, "fuzz") {
        if let Some(groups) = &manifest.weights_manifest {
            let specs = flatten_weight_specs(groups);
            let _ = expected_byte_len(&specs);
            let _ = shard_paths(groups);
        }
    }
});
