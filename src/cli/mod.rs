//! CLI module for place-index.
//!
//! Subcommands:
//! - `merge`: Resolve provider dumps into deduplicated places
//! - `embedding`: Embedding model management

mod embedding;
mod merge;

use clap::{Parser, Subcommand};

pub use embedding::EmbeddingCommand;
pub use merge::MergeCommand;

/// place-index - restaurant entity resolution
#[derive(Parser)]
#[command(name = "place-index")]
#[command(about = "Merge restaurant records from several providers into one deduplicated set")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve Google Maps and Tripadvisor dumps
    Merge(MergeCommand),

    /// Embedding model management
    Embedding {
        #[command(subcommand)]
        command: EmbeddingCommand,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Merge(cmd) => cmd.run().await,
            Command::Embedding { command } => command.run(),
        }
    }
}
