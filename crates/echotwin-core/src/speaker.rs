//! Speaker embedding derivation.
//!
//! This is a placeholder encoder, not a learned model. The embedding is
//! seeded from column averages of the spectrogram, then perturbed by
//! annealed Gaussian noise for a fixed number of epochs. A squared-error
//! loss against the raw column means is computed each epoch for reporting
//! only; it never drives the update. Finally the vector is scaled to unit
//! length.
//!
//! The pitch track is only checked for presence.

use rand::Rng;
use rand_distr::Distribution;
use tracing::{debug, info};

use crate::config::EmbeddingConfig;
use crate::error::{EchoError, EchoResult};
use crate::matrix::FeatureMatrix;
use crate::rng::gaussian;

/// Epoch interval between loss log lines.
const LOG_EVERY: usize = 10;

/// Fixed-length voice summary vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerEmbedding {
    values: Vec<f32>,
}

impl SpeakerEmbedding {
    pub fn from_vec(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Euclidean length.
    pub fn norm(&self) -> f32 {
        l2_norm(&self.values)
    }
}

/// Embedding plus the per-epoch mean squared error of the relaxation.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub embedding: SpeakerEmbedding,
    pub epoch_losses: Vec<f32>,
}

fn l2_norm(values: &[f32]) -> f32 {
    values.iter().map(|v| v * v).sum::<f32>().sqrt()
}

/// `tanh` of the row-mean of evenly strided spectrogram columns.
///
/// Dimension `i` reads column `min(i * step, cols - 1)` with
/// `step = max(1, cols / dim)`, so short inputs repeat their last column.
/// A spectrogram without columns gives all zeros.
pub fn initial_embedding(spectrogram: &FeatureMatrix, dim: usize) -> Vec<f32> {
    let cols = spectrogram.cols();
    if cols == 0 {
        return vec![0.0; dim];
    }
    let step = (cols / dim.max(1)).max(1);
    (0..dim)
        .map(|i| spectrogram.column_mean((i * step).min(cols - 1)).tanh())
        .collect()
}

/// Runs the annealed perturbation in place and returns each epoch's loss.
///
/// Epoch `e` adds `noise * noise_scale * (epochs - e) / epochs` to every
/// dimension, with `noise ~ N(0, noise_std)` drawn in dimension order.
pub fn relax<R: Rng + ?Sized>(
    embedding: &mut [f32],
    spectrogram: &FeatureMatrix,
    config: &EmbeddingConfig,
    rng: &mut R,
) -> EchoResult<Vec<f32>> {
    let normal = gaussian(config.noise_std)?;
    if spectrogram.cols() == 0 {
        return Err(EchoError::data("spectrogram has no columns"));
    }
    let last_col = spectrogram.cols() - 1;
    let targets: Vec<f32> = (0..embedding.len())
        .map(|i| spectrogram.column_mean(i.min(last_col)))
        .collect();

    let epochs = config.epochs;
    let mut losses = Vec::with_capacity(epochs);
    for epoch in 0..epochs {
        let mut loss = 0.0f32;
        for (value, &target) in embedding.iter_mut().zip(&targets) {
            let noise: f32 = normal.sample(rng);
            *value += noise * config.noise_scale * (epochs - epoch) as f32 / epochs as f32;
            let diff = *value - target;
            loss += diff * diff;
        }
        loss /= embedding.len() as f32;

        if epoch % LOG_EVERY == 0 {
            info!(epoch, loss, "relaxation");
        }
        losses.push(loss);
    }

    Ok(losses)
}

/// Scales to unit length; an all-zero vector is left as is.
pub fn normalize(values: &mut [f32]) -> bool {
    let norm = l2_norm(values);
    if norm > 0.0 {
        for v in values.iter_mut() {
            *v /= norm;
        }
        true
    } else {
        false
    }
}

/// Derives a unit-norm embedding of length `config.embed_dim`.
///
/// # Errors
/// Returns a data error if the spectrogram has no rows or columns or the
/// pitch track is empty.
pub fn derive_embedding<R: Rng + ?Sized>(
    spectrogram: &FeatureMatrix,
    pitch_track: &[f32],
    config: &EmbeddingConfig,
    rng: &mut R,
) -> EchoResult<SpeakerEmbedding> {
    derive_with_report(spectrogram, pitch_track, config, rng).map(|d| d.embedding)
}

/// As [`derive_embedding`], also returning the relaxation losses.
pub fn derive_with_report<R: Rng + ?Sized>(
    spectrogram: &FeatureMatrix,
    pitch_track: &[f32],
    config: &EmbeddingConfig,
    rng: &mut R,
) -> EchoResult<Derivation> {
    config.validate()?;
    if spectrogram.rows() == 0 || spectrogram.cols() == 0 {
        return Err(EchoError::data(format!(
            "spectrogram is empty ({}x{})",
            spectrogram.rows(),
            spectrogram.cols()
        )));
    }
    if pitch_track.is_empty() {
        return Err(EchoError::data("pitch track is empty"));
    }

    debug!(
        rows = spectrogram.rows(),
        cols = spectrogram.cols(),
        pitch_frames = pitch_track.len(),
        "deriving embedding"
    );

    let mut values = initial_embedding(spectrogram, config.embed_dim);
    let epoch_losses = relax(&mut values, spectrogram, config, rng)?;
    if !normalize(&mut values) {
        debug!("embedding is all zero, left unnormalized");
    }

    Ok(Derivation {
        embedding: SpeakerEmbedding::from_vec(values),
        epoch_losses,
    })
}
