//! Deterministic RNG using PCG32 with BLAKE3 seed derivation.
//!
//! The relaxation step and the synthesis noise are the only random parts of
//! the pipeline. Both take a caller-supplied generator, so a fixed seed gives
//! byte-identical embeddings and waveforms. Independent streams for the two
//! stages are derived from one base seed by hashing it with a stage key.

use rand::SeedableRng;
use rand_distr::Normal;
use rand_pcg::Pcg32;

use crate::error::{EchoError, EchoResult};

/// Stream key for the embedding relaxation.
pub const TRAINING_STREAM: &str = "training";
/// Stream key for synthesis noise.
pub const SYNTHESIS_STREAM: &str = "synthesis";

/// Creates a PCG32 RNG from a 32-bit seed.
///
/// The 32-bit seed is expanded to 64 bits by duplicating the value in both
/// halves, as required by PCG32's state initialization.
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Derives a seed for a named stage from the base seed.
///
/// # Arguments
/// * `base_seed` - The run's base seed
/// * `key` - Stage identifier, e.g. [`TRAINING_STREAM`]
///
/// # Returns
/// The first four bytes (little-endian) of BLAKE3(base_seed || key)
pub fn derive_component_seed(base_seed: u32, key: &str) -> u32 {
    let mut input = Vec::with_capacity(4 + key.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(key.as_bytes());

    let hash = blake3::hash(&input);
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Creates an RNG for a named stage.
pub fn create_component_rng(base_seed: u32, key: &str) -> Pcg32 {
    create_rng(derive_component_seed(base_seed, key))
}

/// Zero-mean Gaussian with the given standard deviation.
pub fn gaussian(std_dev: f32) -> EchoResult<Normal<f32>> {
    Normal::new(0.0, std_dev).map_err(|e| EchoError::invalid_config("noise_std", e.to_string()))
}
