//! Frame layout shared by the extractors.

use crate::config::FeatureConfig;
use crate::error::{EchoError, EchoResult};

/// Number of analysis frames in `len` samples.
///
/// `floor((len - fft_size) / hop_length) + 1`; fails with a data error when
/// the waveform is shorter than one frame.
pub fn frame_count(len: usize, config: &FeatureConfig) -> EchoResult<usize> {
    config.validate()?;
    if len < config.fft_size {
        return Err(EchoError::data(format!(
            "waveform has {} samples, need at least {}",
            len, config.fft_size
        )));
    }
    Ok((len - config.fft_size) / config.hop_length + 1)
}
