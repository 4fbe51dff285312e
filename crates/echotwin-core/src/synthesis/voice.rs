//! Token oscillator bank.
//!
//! Every token occupies `sample_rate / tokens_per_second` samples. Within a
//! token the signal is a fundamental plus second and third harmonics at
//! relative levels 1, 0.3 and 0.1, shaped by a linear fade in and out over
//! the first and last 10% of the token, plus a little Gaussian noise.

use std::f64::consts::TAU;

use rand::Rng;
use rand_distr::Distribution;
use tracing::debug;

use super::tokenizer::{Token, COMMA_TOKEN, PERIOD_TOKEN, SPACE_TOKEN};
use crate::config::SynthesisConfig;
use crate::error::{EchoError, EchoResult};
use crate::rng::gaussian;
use crate::waveform::Waveform;

/// Relative levels of harmonics 1, 2 and 3.
const HARMONICS: [f64; 3] = [1.0, 0.3, 0.1];

/// Fraction of a token spent fading in, and again fading out.
const FADE_FRACTION: f32 = 0.1;

/// Fundamental of token `token` at position `index`.
///
/// `100 + 10 * token` Hz, scaled by `1 + 0.5 * embedding[index % len]` when
/// an embedding is given, then clamped to `[min_freq, max_freq]`.
pub fn token_frequency(
    token: Token,
    index: usize,
    embedding: &[f32],
    config: &SynthesisConfig,
) -> f32 {
    let mut freq = 100.0 + token as f32 * 10.0;
    if !embedding.is_empty() {
        freq *= 1.0 + embedding[index % embedding.len()] * 0.5;
    }
    freq.clamp(config.min_freq, config.max_freq)
}

/// Base amplitude: quiet for spaces, softer for periods and commas.
pub fn token_amplitude(token: Token) -> f32 {
    match token {
        SPACE_TOKEN => 0.05,
        PERIOD_TOKEN | COMMA_TOKEN => 0.1,
        _ => 0.3,
    }
}

/// Linear fade-in times fade-out gain at sample `j` of a token.
///
/// Zero at and past the end of the token.
pub fn fade_gain(j: usize, samples_per_token: usize) -> f32 {
    let ramp = samples_per_token as f32 * FADE_FRACTION;
    if ramp <= 0.0 {
        return 0.0;
    }
    let fade_in = (j as f32 / ramp).clamp(0.0, 1.0);
    let fade_out = (samples_per_token.saturating_sub(j) as f32 / ramp).clamp(0.0, 1.0);
    fade_in * fade_out
}

/// One pass of `[0.25, 0.5, 0.25]` over the interior; endpoints are kept.
///
/// Each output reads only unsmoothed input samples.
pub fn smooth(input: &[f32]) -> Vec<f32> {
    let mut out = input.to_vec();
    for i in 1..input.len().saturating_sub(1) {
        out[i] = 0.25 * input[i - 1] + 0.5 * input[i] + 0.25 * input[i + 1];
    }
    out
}

/// Renders `tokens` into a waveform at `config.sample_rate`.
///
/// An empty embedding is allowed and leaves every token at its base pitch.
/// An empty token sequence gives an empty waveform.
///
/// # Errors
/// Data error if the embedding holds a NaN or infinite value.
pub fn generate_waveform<R: Rng + ?Sized>(
    tokens: &[Token],
    embedding: &[f32],
    config: &SynthesisConfig,
    rng: &mut R,
) -> EchoResult<Waveform> {
    config.validate()?;
    if let Some(index) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(EchoError::data(format!(
            "embedding value {} is {}",
            index, embedding[index]
        )));
    }
    let noise = gaussian(config.noise_std)?;
    let sample_rate = config.sample_rate as f64;
    let samples_per_token = config.samples_per_token();

    let mut samples = Vec::with_capacity(tokens.len() * samples_per_token);
    for (index, &token) in tokens.iter().enumerate() {
        let freq = token_frequency(token, index, embedding, config) as f64;
        let base_amp = token_amplitude(token);

        for j in 0..samples_per_token {
            let t = j as f64 / sample_rate;
            let amp = (base_amp * fade_gain(j, samples_per_token)) as f64;

            let tone: f64 = HARMONICS
                .iter()
                .enumerate()
                .map(|(h, level)| level * (TAU * freq * (h + 1) as f64 * t).sin())
                .sum();
            let hiss: f32 = noise.sample(rng);
            let sample = (amp * tone) as f32 + hiss * config.noise_scale;

            samples.push(sample.clamp(-1.0, 1.0));
        }
    }

    let samples = smooth(&samples);
    debug!(
        tokens = tokens.len(),
        samples = samples.len(),
        "synthesized waveform"
    );
    Ok(Waveform::new(samples, config.sample_rate))
}
