//! EchoTwin CLI - Command-line interface for voice cloning
//!
//! This binary turns a recorded voice sample into feature arrays, derives a
//! speaker embedding from them and speaks text with that embedding.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// Use modules from the library crate
use echotwin_cli::commands;

/// EchoTwin - Voice featurizing, training and synthesis
#[derive(Parser)]
#[command(name = "echotwin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON config file overriding the built-in constants
    #[arg(long, global = true)]
    config: Option<String>,

    /// Base seed for training and synthesis noise (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u32>,

    /// Log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract spectrogram and pitch arrays from a recorded voice sample
    Featurize {
        /// Input WAV file
        #[arg(short, long, default_value = "voice_sample.wav")]
        input: String,

        /// Output spectrogram array
        #[arg(long, default_value = "mel.npy")]
        mel: String,

        /// Output pitch array
        #[arg(long, default_value = "f0.npy")]
        f0: String,
    },

    /// Derive a speaker embedding from feature arrays
    Train {
        /// Spectrogram array written by featurize
        #[arg(long, default_value = "mel.npy")]
        mel: String,

        /// Pitch array written by featurize
        #[arg(long, default_value = "f0.npy")]
        f0: String,

        /// Output embedding file
        #[arg(short, long, default_value = "voice.vec")]
        output: String,
    },

    /// Speak text with a trained voice
    Say {
        /// Text to speak
        text: String,

        /// Embedding file written by train
        #[arg(long, default_value = "voice.vec")]
        voice: String,

        /// Output WAV file
        #[arg(short, long, default_value = "speech.wav")]
        output: String,
    },

    /// Describe an array or embedding file
    Inspect {
        /// File to inspect (.npy or .vec)
        file: String,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Featurize { input, mel, f0 } => {
            commands::featurize::run(&input, &mel, &f0, config)
        }
        Commands::Train { mel, f0, output } => {
            commands::train::run(&mel, &f0, &output, config, cli.seed)
        }
        Commands::Say {
            text,
            voice,
            output,
        } => commands::say::run(&text, &voice, &output, config, cli.seed),
        Commands::Inspect { file } => commands::inspect::run(&file),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
