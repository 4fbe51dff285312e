//! Named constants and tunable configuration.
//!
//! Every stage reads its sizes from one of the config structs below rather
//! than from literals, so a JSON file can vary them without code changes.
//! `Default` always reproduces the constants.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EchoError, EchoResult};

/// Sample rate every stage works at, in Hz.
pub const SAMPLE_RATE: u32 = 16000;
/// Analysis frame length in samples.
pub const FFT_SIZE: usize = 1024;
/// Stride between consecutive frame starts.
pub const HOP_LENGTH: usize = 256;
/// Rows of the spectrogram array.
pub const MEL_BINS: usize = 80;
/// Length of a speaker embedding.
pub const EMBED_DIM: usize = 256;
/// Number of relaxation passes over the embedding.
pub const TRAINING_EPOCHS: usize = 60;

/// Frame and bin layout shared by the spectral extractor and the pitch tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Sample rate of the incoming waveform.
    pub sample_rate: u32,
    /// Frame length in samples.
    pub fft_size: usize,
    /// Hop between frames in samples.
    pub hop_length: usize,
    /// Number of spectrogram rows.
    pub mel_bins: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            fft_size: FFT_SIZE,
            hop_length: HOP_LENGTH,
            mel_bins: MEL_BINS,
        }
    }
}

impl FeatureConfig {
    /// Number of magnitude positions kept per frame.
    pub fn magnitude_len(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Checks that frames and bins can be laid out.
    pub fn validate(&self) -> EchoResult<()> {
        if self.sample_rate == 0 {
            return Err(EchoError::invalid_config("sample_rate", "must be non-zero"));
        }
        if self.fft_size < 4 {
            return Err(EchoError::invalid_config("fft_size", "must be at least 4"));
        }
        if self.hop_length == 0 {
            return Err(EchoError::invalid_config("hop_length", "must be non-zero"));
        }
        if self.mel_bins == 0 || self.mel_bins > self.magnitude_len() {
            return Err(EchoError::invalid_config(
                "mel_bins",
                format!("must be in 1..={}", self.magnitude_len()),
            ));
        }
        Ok(())
    }
}

/// Parameters of the embedding relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Output vector length.
    pub embed_dim: usize,
    /// Number of relaxation passes.
    pub epochs: usize,
    /// Standard deviation of the per-dimension perturbation.
    pub noise_std: f32,
    /// Multiplier applied to each perturbation before annealing.
    pub noise_scale: f32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            embed_dim: EMBED_DIM,
            epochs: TRAINING_EPOCHS,
            noise_std: 0.01,
            noise_scale: 0.001,
        }
    }
}

impl EmbeddingConfig {
    /// Checks the relaxation parameters.
    pub fn validate(&self) -> EchoResult<()> {
        if self.embed_dim == 0 {
            return Err(EchoError::invalid_config("embed_dim", "must be non-zero"));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(EchoError::invalid_config(
                "noise_std",
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Parameters of the token oscillator bank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Output sample rate.
    pub sample_rate: u32,
    /// Tokens rendered per second; each token lasts `sample_rate / tokens_per_second` samples.
    pub tokens_per_second: u32,
    /// Standard deviation of the additive noise source.
    pub noise_std: f32,
    /// Multiplier applied to each noise draw.
    pub noise_scale: f32,
    /// Lowest fundamental allowed, in Hz.
    pub min_freq: f32,
    /// Highest fundamental allowed, in Hz.
    pub max_freq: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            tokens_per_second: 10,
            noise_std: 0.1,
            noise_scale: 0.02,
            min_freq: 50.0,
            max_freq: 500.0,
        }
    }
}

impl SynthesisConfig {
    /// Samples rendered for a single token.
    pub fn samples_per_token(&self) -> usize {
        (self.sample_rate / self.tokens_per_second) as usize
    }

    /// Checks the oscillator parameters.
    pub fn validate(&self) -> EchoResult<()> {
        if self.sample_rate == 0 {
            return Err(EchoError::invalid_config("sample_rate", "must be non-zero"));
        }
        if self.tokens_per_second == 0 || self.tokens_per_second > self.sample_rate {
            return Err(EchoError::invalid_config(
                "tokens_per_second",
                "must be in 1..=sample_rate",
            ));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(EchoError::invalid_config(
                "noise_std",
                "must be finite and non-negative",
            ));
        }
        if !(self.min_freq > 0.0 && self.min_freq <= self.max_freq) {
            return Err(EchoError::invalid_config(
                "min_freq",
                "must be positive and not above max_freq",
            ));
        }
        Ok(())
    }
}

/// Top-level configuration, as read from a JSON file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Feature extraction layout.
    pub features: FeatureConfig,
    /// Embedding relaxation.
    pub embedding: EmbeddingConfig,
    /// Speech synthesis.
    pub synthesis: SynthesisConfig,
}

impl EchoConfig {
    /// Parses a config from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> EchoResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EchoError::invalid_config("json", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> EchoResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| EchoError::io(path, e))?;
        Self::from_json_str(&text)
    }

    /// Validates every section.
    pub fn validate(&self) -> EchoResult<()> {
        self.features.validate()?;
        self.embedding.validate()?;
        self.synthesis.validate()
    }
}
