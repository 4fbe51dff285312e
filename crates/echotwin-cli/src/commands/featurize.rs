//! Featurize command implementation
//!
//! Reads a recorded voice sample and writes the spectrogram and pitch arrays.

use anyhow::{Context, Result};
use colored::Colorize;
use echotwin_core::pipeline;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use crate::audio_io::load_voice_sample;

/// Run the featurize command
///
/// # Arguments
/// * `input` - WAV file with the voice sample
/// * `mel_path` - Output path for the spectrogram array
/// * `f0_path` - Output path for the pitch array
/// * `config_path` - Optional JSON config file
pub fn run(
    input: &str,
    mel_path: &str,
    f0_path: &str,
    config_path: Option<&str>,
) -> Result<ExitCode> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    println!("{} {}", "Featurizing:".cyan().bold(), input);

    let waveform = load_voice_sample(Path::new(input), config.features.sample_rate)?;
    println!(
        "{} {:.2}s at {} Hz",
        "Audio:".dimmed(),
        waveform.duration_seconds(),
        waveform.sample_rate()
    );

    let summary = pipeline::featurize(&waveform, &config.features, mel_path, f0_path)
        .with_context(|| format!("Failed to featurize {}", input))?;

    println!(
        "  {} {} ({}x{})",
        "->".dimmed(),
        mel_path,
        summary.mel_bins,
        summary.frames
    );
    println!(
        "  {} {} ({} frames, {} voiced)",
        "->".dimmed(),
        f0_path,
        summary.frames,
        summary.voiced_frames
    );
    println!(
        "{} in {}ms",
        "SUCCESS".green().bold(),
        start.elapsed().as_millis()
    );
    Ok(ExitCode::SUCCESS)
}
