//! Per-frame feature extraction.
//!
//! Both extractors cut the waveform into the same overlapping frames
//! (`fft_size` samples, advancing by `hop_length`), so a spectrogram column
//! and a pitch value with the same index describe the same stretch of audio.
//!
//! - [`spectrogram`] - windowed magnitude proxy binned into `mel_bins` rows
//! - [`pitch`] - autocorrelation fundamental-frequency track

mod frames;
pub mod pitch;
pub mod spectrogram;

pub use frames::frame_count;
pub use pitch::track_pitch;
pub use spectrogram::extract_spectrogram;
