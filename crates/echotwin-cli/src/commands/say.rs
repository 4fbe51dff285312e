//! Say command implementation
//!
//! Synthesizes text with a trained voice and writes a WAV file.

use anyhow::{Context, Result};
use colored::Colorize;
use echotwin_core::pipeline;
use echotwin_core::rng::{create_component_rng, SYNTHESIS_STREAM};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use crate::audio_io::write_wav;

/// Run the say command
///
/// # Arguments
/// * `text` - Text to speak
/// * `voice` - Embedding file written by `train`
/// * `output` - Output WAV path
/// * `config_path` - Optional JSON config file
/// * `seed` - Base seed; drawn at random when absent
pub fn run(
    text: &str,
    voice: &str,
    output: &str,
    config_path: Option<&str>,
    seed: Option<u32>,
) -> Result<ExitCode> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    println!("{} {:?}", "Speaking:".cyan().bold(), text);
    println!("{} {}", "Voice:".dimmed(), voice);
    let seed = super::resolve_seed(seed);
    let mut rng = create_component_rng(seed, SYNTHESIS_STREAM);

    let waveform = pipeline::say(text, voice, &config.synthesis, &mut rng)
        .with_context(|| format!("Failed to synthesize with voice {}", voice))?;

    let wav = write_wav(Path::new(output), &waveform)
        .with_context(|| format!("Failed to write {}", output))?;

    println!(
        "  {} {} ({:.2}s, {})",
        "->".dimmed(),
        output,
        wav.duration_seconds(),
        &wav.pcm_hash[..16]
    );
    println!(
        "{} in {}ms",
        "SUCCESS".green().bold(),
        start.elapsed().as_millis()
    );
    Ok(ExitCode::SUCCESS)
}
