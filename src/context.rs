//! Application context wiring configured collaborators into engines.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::index::{Embedder, SimilarityIndex};
use crate::llm::{LlmTagMerger, TagMerger};
use crate::services::{Merger, TagOracle};

/// Shared embedding backend.
pub type AppEmbedder = Arc<dyn Embedder>;

/// Shared tag-merge oracle.
pub type AppTagMerger = Arc<dyn TagMerger>;

/// Root application context.
///
/// Holds the long-lived collaborators; each call to [`Context::merger`] gets a
/// fresh engine with empty state that shares them.
#[derive(Clone)]
pub struct Context {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Embedding backend used for place names.
    pub embedder: AppEmbedder,
    /// Present only when `merger.use_llm` is enabled.
    pub tag_merger: Option<AppTagMerger>,
}

impl Context {
    /// Creates a context with explicit collaborators.
    pub fn new(config: Config, embedder: AppEmbedder, tag_merger: Option<AppTagMerger>) -> Self {
        Self {
            config: Arc::new(config),
            embedder,
            tag_merger,
        }
    }

    /// Builds every collaborator from configuration.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let embedder = Self::create_embedder(&config, config.embedding.show_download_progress)?;
        let tag_merger = Self::create_tag_merger(&config)?;
        Ok(Self::new(config, embedder, tag_merger))
    }

    /// Instantiates the configured embedding provider.
    #[cfg_attr(not(feature = "fastembed"), allow(unused_variables))]
    pub fn create_embedder(config: &Config, show_progress: bool) -> Result<AppEmbedder, AppError> {
        match config.embedding.provider.as_str() {
            #[cfg(feature = "fastembed")]
            "fastembed" => {
                let mut embedding = config.embedding.clone();
                embedding.show_download_progress = show_progress;
                let embedder = crate::index::backends::fastembed::FastEmbedder::new(&embedding)?;
                Ok(Arc::new(embedder))
            }
            other => Err(AppError::Embedding(format!(
                "embedding provider '{}' is not available in this build",
                other
            ))),
        }
    }

    /// Builds the oracle client, only when enabled.
    pub fn create_tag_merger(config: &Config) -> Result<Option<AppTagMerger>, AppError> {
        if !config.merger.use_llm {
            return Ok(None);
        }
        let merger = LlmTagMerger::new(&config.llm)?;
        tracing::info!("Tag merging delegated to {} at {}", config.llm.model, config.llm.base_url);
        Ok(Some(Arc::new(merger)))
    }

    /// A new resolution engine with empty state.
    pub fn merger(&self) -> Merger {
        let index = SimilarityIndex::flat(self.embedder.clone());
        let merger = Merger::new(index).with_match_threshold(self.config.merger.match_threshold);

        match &self.tag_merger {
            Some(tag_merger) => merger.with_tag_oracle(TagOracle::new(
                tag_merger.clone(),
                self.config.llm.timeout(),
            )),
            None => merger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergerConfig;

    struct UnitEmbedder;

    impl Embedder for UnitEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, AppError> {
            Ok(vec![1.0, 0.0])
        }
    }

    #[test]
    fn test_no_tag_merger_when_llm_disabled() {
        let config = Config::default();
        assert!(Context::create_tag_merger(&config).unwrap().is_none());
    }

    #[test]
    fn test_unknown_embedding_provider() {
        let mut config = Config::default();
        config.embedding.provider = "word2vec".to_string();
        let err = Context::create_embedder(&config, false).err().unwrap();
        assert!(matches!(err, AppError::Embedding(_)));
    }

    #[test]
    fn test_merger_uses_configured_threshold() {
        let config = Config {
            merger: MergerConfig {
                match_threshold: 0.2,
                use_llm: false,
            },
            ..Config::default()
        };
        let ctx = Context::new(config, Arc::new(UnitEmbedder), None);

        let merger = ctx.merger();
        assert_eq!(merger.match_threshold(), 0.2);
        assert!(merger.places().is_empty());
    }
}
