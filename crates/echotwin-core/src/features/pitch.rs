//! Autocorrelation pitch tracking.

use tracing::debug;

use super::frames::frame_count;
use crate::config::FeatureConfig;
use crate::error::EchoResult;
use crate::waveform::Waveform;

/// Autocorrelation peak a frame must exceed to count as voiced.
pub const VOICING_THRESHOLD: f32 = 0.3;

/// Mean-normalized autocorrelation of the frame starting at `start`.
///
/// Index `lag` holds the mean of `samples[start + i] * samples[start + i + lag]`
/// over the offsets that stay inside both the frame and the waveform.
/// Index 0 is unused and left at zero.
pub fn autocorrelation(samples: &[f32], start: usize, fft_size: usize) -> Vec<f32> {
    let mut ac = vec![0.0f32; fft_size / 2];

    for (lag, value) in ac.iter_mut().enumerate().skip(1) {
        let mut sum = 0.0f32;
        let mut count = 0usize;
        let mut i = 0;
        while i + lag < fft_size && start + i + lag < samples.len() {
            sum += samples[start + i] * samples[start + i + lag];
            count += 1;
            i += 1;
        }
        *value = if count > 0 { sum / count as f32 } else { 0.0 };
    }

    ac
}

/// Picks the strongest lag.
///
/// The running best starts at lag 1 and only a strictly larger value from
/// lag 2 onward replaces it, so ties resolve to the shortest lag.
fn best_lag(ac: &[f32]) -> (usize, f32) {
    let mut max_lag = 1;
    let mut max_val = ac[1];
    for (lag, &value) in ac.iter().enumerate().skip(2) {
        if value > max_val {
            max_val = value;
            max_lag = lag;
        }
    }
    (max_lag, max_val)
}

/// Estimates one fundamental frequency per frame, `0.0` for unvoiced frames.
///
/// # Errors
/// Returns a data error if the waveform is shorter than one frame.
pub fn track_pitch(waveform: &Waveform, config: &FeatureConfig) -> EchoResult<Vec<f32>> {
    let samples = waveform.samples();
    let num_frames = frame_count(samples.len(), config)?;
    let sample_rate = waveform.sample_rate() as f32;

    let track: Vec<f32> = (0..num_frames)
        .map(|frame| {
            let ac = autocorrelation(samples, frame * config.hop_length, config.fft_size);
            let (lag, peak) = best_lag(&ac);
            if peak > VOICING_THRESHOLD {
                sample_rate / lag as f32
            } else {
                0.0
            }
        })
        .collect();

    let voiced = track.iter().filter(|&&f0| f0 > 0.0).count();
    debug!(frames = num_frames, voiced, "tracked pitch");
    Ok(track)
}
