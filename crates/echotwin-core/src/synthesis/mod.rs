//! Text-to-waveform synthesis.
//!
//! Text is mapped one character to one token ([`tokenizer`]); each token is
//! rendered as a fixed-length harmonic tone whose pitch is nudged by the
//! speaker embedding ([`voice`]). The concatenated tones are smoothed once
//! with a 3-tap filter.

pub mod tokenizer;
pub mod voice;

pub use tokenizer::{tokenize, Token};
pub use voice::generate_waveform;
