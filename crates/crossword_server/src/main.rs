//! Crossword Server - Unified CLI
//!
//! Runs the game server or generates crosswords from the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use crossword_core::{CrosswordGenerator, Dictionary};
use crossword_server::ServerConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Serve { config, host, port } => run_server(&config, host, port).await,
        Command::Generate {
            config,
            words,
            seed,
            words_path,
        } => run_generate(&config, words, seed, words_path),
        Command::Words { words_path } => run_words(words_path),
    }
}

fn initialize_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,crossword_server=debug")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the HTTP game server
#[instrument(skip_all, fields(config_path = %config_path.display()))]
async fn run_server(config_path: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    info!("Starting crossword server");

    let mut config = ServerConfig::load(config_path)?;

    if let Some(host) = host {
        config = config.with_host(host);
    }

    if std::env::var("CROSSWORD_ENV").is_ok_and(|env| env == "production") {
        info!("Production mode, accepting any origin");
        config = config.with_any_origin();
    }

    let env_port = std::env::var("PORT").ok().and_then(|p| p.parse().ok());
    if let Some(port) = port.or(env_port) {
        config = config.with_port(port);
    }

    crossword_server::serve(config).await
}

/// Print one generated crossword
#[instrument(skip_all, fields(config_path = %config_path.display()))]
fn run_generate(
    config_path: &Path,
    words: Option<usize>,
    seed: Option<u64>,
    words_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = ServerConfig::load(config_path)?;
    if let Some(path) = words_path {
        config = config.with_words_path(path);
    }
    if let Some(seed) = seed {
        config = config.with_rng_seed(seed);
    }

    let dictionary = Arc::new(config.dictionary()?);
    let generator = CrosswordGenerator::new(dictionary, config.generator().clone());
    let target = words.unwrap_or(*generator.config().default_word_count());

    let mut rng = match config.rng_seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_entropy(),
    };

    let crossword = generator.generate(target, &mut rng)?;
    info!(placed = crossword.len(), target, "Crossword generated");
    println!("{crossword}");

    Ok(())
}

/// Print dictionary statistics
#[instrument(skip_all)]
fn run_words(words_path: Option<PathBuf>) -> Result<()> {
    let dictionary = match words_path {
        Some(path) => Dictionary::from_file(path)?,
        None => Dictionary::builtin()?,
    };

    let stats = dictionary.stats();
    println!("Total entries: {}", stats.total);
    println!("Playable words: {}", stats.playable);
    println!("Sample: {}", stats.sample.join(", "));

    Ok(())
}
