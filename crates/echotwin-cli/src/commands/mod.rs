//! CLI command implementations

pub mod featurize;
pub mod inspect;
pub mod say;
pub mod train;

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use echotwin_core::EchoConfig;

/// Loads the config file if one was given, defaults otherwise.
pub fn load_config(path: Option<&str>) -> Result<EchoConfig> {
    match path {
        Some(path) => {
            let config = EchoConfig::load(Path::new(path))
                .with_context(|| format!("Failed to load config file: {}", path))?;
            println!("{} {}", "Config:".dimmed(), path);
            Ok(config)
        }
        None => Ok(EchoConfig::default()),
    }
}

/// Uses the given seed or draws a fresh one, and reports which.
pub fn resolve_seed(seed: Option<u32>) -> u32 {
    let seed = seed.unwrap_or_else(rand::random);
    println!("{} {}", "Seed:".dimmed(), seed);
    seed
}
