//! Application error types.

use thiserror::Error;

use crate::llm::TagMergeError;

/// Application-level errors for place-index.
///
/// `Embedding`, `Index` and `Config` are configuration-fatal: the resolution
/// engine cannot make progress without a working index. `MissingEntity` means
/// the similarity index and the entity store went out of lockstep.
#[derive(Error, Debug)]
pub enum AppError {
    // Similarity index errors
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    // Resolution errors
    #[error("Matched key '{0}' has no entity in the store")]
    MissingEntity(String),

    #[error("Tag merge failed: {0}")]
    TagMerge(#[from] TagMergeError),

    // Provider dump errors
    #[error("Invalid {provider} record: {message}")]
    Provider { provider: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AppError {
    /// Returns true for errors that must abort a whole run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::TagMerge(_) | AppError::Provider { .. })
    }
}
