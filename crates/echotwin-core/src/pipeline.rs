//! File-to-file stages.
//!
//! ```text
//! waveform --featurize--> mel.npy + f0.npy --train--> voice.vec --say--> waveform
//! ```
//!
//! Each stage checks its own inputs and fails without writing anything when
//! they are unusable.

use std::path::Path;

use rand::Rng;
use tracing::info;

use crate::config::{EmbeddingConfig, FeatureConfig, SynthesisConfig};
use crate::error::{EchoError, EchoResult};
use crate::features::{extract_spectrogram, track_pitch};
use crate::serialize::{
    load_embedding, load_matrix, load_vector, save_embedding, save_matrix, save_vector,
};
use crate::speaker::derive_with_report;
use crate::synthesis::{generate_waveform, tokenize};
use crate::waveform::Waveform;

/// Shape of the features written by [`featurize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturizeSummary {
    /// Spectrogram rows.
    pub mel_bins: usize,
    /// Frames, i.e. spectrogram columns and pitch values.
    pub frames: usize,
    /// Frames with a non-zero pitch.
    pub voiced_frames: usize,
}

/// Outcome of [`train`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Length of the written embedding.
    pub embedding_dim: usize,
    /// Spectrogram columns consumed.
    pub frames: usize,
    /// Euclidean length of the written embedding.
    pub norm: f32,
    /// Mean squared error of each relaxation epoch.
    pub epoch_losses: Vec<f32>,
}

/// Extracts both feature arrays from `waveform` and writes them.
///
/// # Errors
/// Data error if the waveform is too short or not at `config.sample_rate`;
/// I/O error if either file cannot be written.
pub fn featurize(
    waveform: &Waveform,
    config: &FeatureConfig,
    mel_path: impl AsRef<Path>,
    f0_path: impl AsRef<Path>,
) -> EchoResult<FeaturizeSummary> {
    if waveform.sample_rate() != config.sample_rate {
        return Err(EchoError::data(format!(
            "waveform is {} Hz, features expect {} Hz",
            waveform.sample_rate(),
            config.sample_rate
        )));
    }

    let spectrogram = extract_spectrogram(waveform, config)?;
    let pitch = track_pitch(waveform, config)?;

    save_matrix(mel_path.as_ref(), &spectrogram)?;
    save_vector(f0_path.as_ref(), &pitch)?;

    let summary = FeaturizeSummary {
        mel_bins: spectrogram.rows(),
        frames: spectrogram.cols(),
        voiced_frames: pitch.iter().filter(|&&f0| f0 > 0.0).count(),
    };
    info!(
        mel_bins = summary.mel_bins,
        frames = summary.frames,
        voiced = summary.voiced_frames,
        "featurized"
    );
    Ok(summary)
}

/// Loads both feature arrays, derives an embedding and writes it.
pub fn train<R: Rng + ?Sized>(
    mel_path: impl AsRef<Path>,
    f0_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    config: &EmbeddingConfig,
    rng: &mut R,
) -> EchoResult<TrainingReport> {
    let spectrogram = load_matrix(mel_path.as_ref())?;
    let pitch = load_vector(f0_path.as_ref())?;
    info!(
        rows = spectrogram.rows(),
        cols = spectrogram.cols(),
        pitch_frames = pitch.len(),
        "loaded features"
    );

    let derivation = derive_with_report(&spectrogram, &pitch, config, rng)?;
    save_embedding(out_path.as_ref(), derivation.embedding.as_slice())?;

    info!(
        dim = derivation.embedding.len(),
        path = %out_path.as_ref().display(),
        "saved voice embedding"
    );
    Ok(TrainingReport {
        embedding_dim: derivation.embedding.len(),
        frames: spectrogram.cols(),
        norm: derivation.embedding.norm(),
        epoch_losses: derivation.epoch_losses,
    })
}

/// Synthesizes `text` in the voice stored at `voice_path`.
///
/// # Errors
/// Data error if the voice file holds no values or the text is empty.
pub fn say<R: Rng + ?Sized>(
    text: &str,
    voice_path: impl AsRef<Path>,
    config: &SynthesisConfig,
    rng: &mut R,
) -> EchoResult<Waveform> {
    let embedding = load_embedding(voice_path.as_ref())?;
    if embedding.is_empty() {
        return Err(EchoError::data("voice embedding is empty"));
    }

    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Err(EchoError::data("nothing to say"));
    }

    let waveform = generate_waveform(&tokens, &embedding, config, rng)?;
    info!(
        tokens = tokens.len(),
        seconds = waveform.duration_seconds(),
        "generated speech"
    );
    Ok(waveform)
}
