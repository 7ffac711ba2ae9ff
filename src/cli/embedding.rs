//! Embedding model management commands.

use clap::Subcommand;
use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;

/// Embedding model management subcommands.
#[derive(Subcommand)]
pub enum EmbeddingCommand {
    /// Pre-download the embedding model
    Warmup,
}

impl EmbeddingCommand {
    /// Run the embedding subcommand.
    pub fn run(&self) -> Result<()> {
        match self {
            EmbeddingCommand::Warmup => run_warmup(),
        }
    }
}

/// Warm up the embedding model by downloading it to the cache.
fn run_warmup() -> Result<()> {
    let config = Config::load()?;

    println!("Warming up embedding model: {}", config.embedding.model);

    let embedder = Context::create_embedder(&config, true)?;
    let dimensions = embedder.embed("warmup")?.len();

    let cache_dir = config
        .embedding
        .cache_dir
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".fastembed_cache".to_string());

    println!(
        "Embedding model ready: {} ({} dimensions)",
        config.embedding.model, dimensions
    );
    println!("Cache location: {}", cache_dir);

    Ok(())
}
