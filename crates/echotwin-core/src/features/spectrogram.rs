//! Spectrogram-style feature extraction.
//!
//! Each frame is Hann-windowed, and the absolute value of the first
//! `fft_size / 2 + 1` windowed samples stands in for a magnitude spectrum.
//! No Fourier transform is taken. The magnitudes are averaged over
//! `mel_bins` equal-width contiguous index ranges and log-compressed.
//! The rows are linear bins despite the "mel" name; stored voice models
//! depend on these exact values.

use std::f64::consts::PI;

use tracing::debug;

use super::frames::frame_count;
use crate::config::FeatureConfig;
use crate::error::EchoResult;
use crate::matrix::FeatureMatrix;
use crate::waveform::Waveform;

/// Floor added to magnitudes and to bin means before the logarithm.
const MAGNITUDE_FLOOR: f32 = 1e-8;

/// Symmetric Hann window of `size` points; a single point is `[1.0]`.
pub fn hann_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| (0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos()) as f32)
        .collect()
}

/// Half-open `[start, end)` index range of each bin over `len` magnitudes.
pub fn bin_ranges(len: usize, bins: usize) -> Vec<(usize, usize)> {
    (0..bins)
        .map(|bin| (bin * len / bins, (bin + 1) * len / bins))
        .collect()
}

/// Converts a waveform into a `mel_bins x frame_count` array.
///
/// # Errors
/// Returns a data error if the waveform is shorter than one frame.
pub fn extract_spectrogram(
    waveform: &Waveform,
    config: &FeatureConfig,
) -> EchoResult<FeatureMatrix> {
    let samples = waveform.samples();
    let num_frames = frame_count(samples.len(), config)?;

    let window = hann_window(config.fft_size);
    let ranges = bin_ranges(config.magnitude_len(), config.mel_bins);
    let mut spectrogram = FeatureMatrix::zeros(config.mel_bins, num_frames);
    let mut magnitude = vec![0.0f32; config.magnitude_len()];

    for frame in 0..num_frames {
        let start = frame * config.hop_length;

        for (i, mag) in magnitude.iter_mut().enumerate() {
            let windowed = samples.get(start + i).map_or(0.0, |s| s * window[i]);
            *mag = windowed.abs() + MAGNITUDE_FLOOR;
        }

        for (bin, &(lo, hi)) in ranges.iter().enumerate() {
            let sum: f32 = magnitude[lo..hi].iter().sum();
            let mean = sum / (hi - lo) as f32;
            spectrogram.set(bin, frame, (mean + MAGNITUDE_FLOOR).log10());
        }
    }

    debug!(
        rows = config.mel_bins,
        frames = num_frames,
        "extracted spectrogram"
    );
    Ok(spectrogram)
}
