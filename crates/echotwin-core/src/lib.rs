//! EchoTwin Core
//!
//! Turns recorded speech into a compact numeric voice description and back:
//!
//! 1. [`features`] cuts a 16 kHz waveform into overlapping frames and
//!    produces an 80-row spectrogram-style array and a per-frame pitch track.
//! 2. [`serialize`] stores those arrays as `.npy` files and embeddings as
//!    length-prefixed `.vec` files.
//! 3. [`speaker`] condenses the spectrogram into a unit-norm 256-dimensional
//!    speaker embedding.
//! 4. [`synthesis`] renders text as a harmonic tone sequence whose pitch is
//!    shaped by the embedding.
//!
//! Audio capture, playback and WAV encoding or decoding live outside this
//! crate; it consumes and produces plain sample buffers ([`Waveform`]).
//!
//! # Determinism
//!
//! The embedding relaxation and the synthesis noise are the only random
//! steps. Both take the generator as a parameter; with a seeded PCG32 from
//! [`rng`] the output is identical across runs.
//!
//! # Example
//!
//! ```ignore
//! use echotwin_core::{pipeline, rng, EchoConfig};
//!
//! let config = EchoConfig::default();
//! pipeline::featurize(&waveform, &config.features, "mel.npy", "f0.npy")?;
//!
//! let mut train_rng = rng::create_component_rng(42, rng::TRAINING_STREAM);
//! pipeline::train("mel.npy", "f0.npy", "voice.vec", &config.embedding, &mut train_rng)?;
//!
//! let mut synth_rng = rng::create_component_rng(42, rng::SYNTHESIS_STREAM);
//! let speech = pipeline::say("Hello there.", "voice.vec", &config.synthesis, &mut synth_rng)?;
//! assert_eq!(speech.sample_rate(), config.synthesis.sample_rate);
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod matrix;
pub mod pipeline;
pub mod rng;
pub mod serialize;
pub mod speaker;
pub mod synthesis;
pub mod waveform;

// Re-export main types at crate root
pub use config::{EchoConfig, EmbeddingConfig, FeatureConfig, SynthesisConfig};
pub use error::{EchoError, EchoResult};
pub use matrix::FeatureMatrix;
pub use speaker::{derive_embedding, SpeakerEmbedding};
pub use waveform::Waveform;
