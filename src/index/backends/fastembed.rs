//! Local sentence embeddings via fastembed.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::config::EmbeddingConfig;
use crate::error::AppError;
use crate::index::{DistanceMetric, Embedder};

/// fastembed text model.
///
/// Models are downloaded on first use into the configured cache directory.
pub struct FastEmbedder {
    model: TextEmbedding,
}

impl FastEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, AppError> {
        let model = Self::model_for(&config.model)?;

        let mut options =
            InitOptions::new(model).with_show_download_progress(config.show_download_progress);
        if let Some(dir) = &config.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| AppError::Embedding(format!("failed to load {}: {}", config.model, e)))?;

        tracing::info!("Loaded embedding model {}", config.model);
        Ok(Self { model })
    }

    fn model_for(name: &str) -> Result<EmbeddingModel, AppError> {
        match name {
            "BAAI/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
            "BAAI/bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
            "sentence-transformers/all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
            "intfloat/multilingual-e5-small" => Ok(EmbeddingModel::MultilingualE5Small),
            "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2" => {
                Ok(EmbeddingModel::ParaphraseMLMiniLML12V2)
            }
            other => Err(AppError::Embedding(format!(
                "unsupported fastembed model '{}'",
                other
            ))),
        }
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.model
            .embed(vec![text], None)
            .map_err(|e| AppError::Embedding(e.to_string()))?
            .pop()
            .ok_or_else(|| AppError::Embedding("model returned no embedding".to_string()))
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Cosine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_model_rejected() {
        let err = FastEmbedder::model_for("openai/text-embedding-3-small").unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }
}
