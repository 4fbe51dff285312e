//! EchoTwin CLI library.
//!
//! Command implementations and the WAV input boundary for the `echotwin`
//! binary.

pub mod audio_io;
pub mod commands;
