//! Train command implementation
//!
//! Derives a speaker embedding from feature arrays written by `featurize`.

use anyhow::{Context, Result};
use colored::Colorize;
use echotwin_core::pipeline;
use echotwin_core::rng::{create_component_rng, TRAINING_STREAM};
use std::process::ExitCode;
use std::time::Instant;

/// Run the train command
///
/// # Arguments
/// * `mel_path` - Spectrogram array file
/// * `f0_path` - Pitch array file
/// * `output` - Output embedding file
/// * `config_path` - Optional JSON config file
/// * `seed` - Base seed; drawn at random when absent
pub fn run(
    mel_path: &str,
    f0_path: &str,
    output: &str,
    config_path: Option<&str>,
    seed: Option<u32>,
) -> Result<ExitCode> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    println!("{} {} + {}", "Training:".cyan().bold(), mel_path, f0_path);
    let seed = super::resolve_seed(seed);
    let mut rng = create_component_rng(seed, TRAINING_STREAM);

    let report = pipeline::train(mel_path, f0_path, output, &config.embedding, &mut rng)
        .with_context(|| format!("Failed to train voice from {}", mel_path))?;

    if let Some(loss) = report.epoch_losses.last() {
        println!(
            "{} {} epochs, final loss {:.6}",
            "Relaxed:".dimmed(),
            report.epoch_losses.len(),
            loss
        );
    }
    println!(
        "  {} {} ({} dims, norm {:.4}, {} frames)",
        "->".dimmed(),
        output,
        report.embedding_dim,
        report.norm,
        report.frames
    );
    println!(
        "{} in {}ms",
        "SUCCESS".green().bold(),
        start.elapsed().as_millis()
    );
    Ok(ExitCode::SUCCESS)
}
