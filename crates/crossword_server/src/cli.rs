//! Command-line interface for crossword_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crossword Server - multiplayer crossword game over HTTP
#[derive(Parser, Debug)]
#[command(name = "crossword_server")]
#[command(about = "Multiplayer crossword game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to the server config file
        #[arg(short, long, default_value = "crossword_server.toml")]
        config: PathBuf,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate one crossword and print it
    Generate {
        /// Path to the server config file
        #[arg(short, long, default_value = "crossword_server.toml")]
        config: PathBuf,

        /// Number of words to place
        #[arg(short, long)]
        words: Option<usize>,

        /// Seed for a reproducible crossword
        #[arg(long)]
        seed: Option<u64>,

        /// JSON dictionary to draw words from (overrides config)
        #[arg(long)]
        words_path: Option<PathBuf>,
    },

    /// Show dictionary statistics
    Words {
        /// JSON dictionary to inspect instead of the bundled one
        #[arg(long)]
        words_path: Option<PathBuf>,
    },
}
