//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/place-index/config.toml` (XDG) or platform config dir
//! 2. Project config: `.place-index.toml`
//! 3. Environment variables: `PLACE_INDEX_*`, nested with `__`
//!    (e.g. `PLACE_INDEX_MERGER__MATCH_THRESHOLD=0.2`)
//!
//! Every section has defaults, so running without any config file is valid.
//!
//! # Intended Usage
//!
//! **Global config** (`~/.config/place-index/config.toml`):
//! ```toml
//! [embedding]
//! provider = "fastembed"
//! model = "BAAI/bge-small-en-v1.5"
//!
//! [llm]
//! base_url = "https://api.deepseek.com"
//! model = "deepseek-chat"
//! api_key = "sk-..."
//! ```
//!
//! **Project config** (`.place-index.toml` next to the provider dumps):
//! ```toml
//! [merger]
//! match_threshold = 0.35
//! use_llm = true
//! ```

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Default match threshold on the embedder's native distance scale.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.35;

/// Environment variable read when `llm.api_key` is not configured.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub merger: MergerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding provider name (only "fastembed" is built in).
    pub provider: String,
    /// Model identifier (e.g., "BAAI/bge-small-en-v1.5").
    pub model: String,
    /// Where downloaded model files are cached.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub show_download_progress: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "fastembed".to_string(),
            model: "BAAI/bge-small-en-v1.5".to_string(),
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

/// Resolution engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergerConfig {
    /// Distances strictly below this value are treated as the same place.
    pub match_threshold: f32,
    /// Delegate tag reconciliation to the LLM oracle.
    ///
    /// No HTTP client is built unless this is set.
    pub use_llm: bool,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            use_llm: false,
        }
    }
}

/// OpenAI-compatible chat endpoint used as the tag-merge oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Falls back to the `DEEPSEEK_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Upper bound on a single oracle call before falling back to set union.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured key, or the one from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeout_secs == 0 {
            return Err(AppError::InvalidConfig(
                "llm.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl MergerConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.match_threshold.is_finite() || self.match_threshold < 0.0 {
            return Err(AppError::InvalidConfig(format!(
                "merger.match_threshold must be a non-negative number, got {}",
                self.match_threshold
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load config with layered resolution (defaults → user → project → env).
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(Path::new(".place-index.toml"))
    }

    /// Same as [`Config::load`] with an explicit project config path.
    pub fn load_from(project_config: &Path) -> Result<Self, AppError> {
        let config: Config = Self::figment(project_config)
            .extract()
            .map_err(ConfigError::from)?;
        config.merger.validate()?;
        config.llm.validate()?;
        Ok(config)
    }

    fn figment(project_config: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(project_config))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("PLACE_INDEX_").split("__"))
    }

    /// User config path: ~/.config/place-index/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("place-index").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("place-index").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml")).unwrap();

        assert_eq!(config.merger.match_threshold, DEFAULT_MATCH_THRESHOLD);
        assert!(!config.merger.use_llm);
        assert_eq!(config.embedding.provider, "fastembed");
        assert_eq!(config.llm.timeout(), Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_project_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".place-index.toml");
        std::fs::write(
            &path,
            "[merger]\nmatch_threshold = 0.2\nuse_llm = true\n\n[llm]\nmodel = \"other\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.merger.match_threshold, 0.2);
        assert!(config.merger.use_llm);
        assert_eq!(config.llm.model, "other");
        // Untouched keys keep their defaults
        assert_eq!(config.llm.base_url, "https://api.deepseek.com");
    }

    #[test]
    #[serial]
    fn test_env_overrides_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".place-index.toml");
        std::fs::write(&path, "[merger]\nmatch_threshold = 0.2\n").unwrap();

        std::env::set_var("PLACE_INDEX_MERGER__MATCH_THRESHOLD", "0.5");
        let result = Config::load_from(&path);
        std::env::remove_var("PLACE_INDEX_MERGER__MATCH_THRESHOLD");

        assert_eq!(result.unwrap().merger.match_threshold, 0.5);
    }

    #[test]
    #[serial]
    fn test_negative_threshold_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".place-index.toml");
        std::fs::write(&path, "[merger]\nmatch_threshold = -1.0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    #[serial]
    fn test_zero_llm_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".place-index.toml");
        std::fs::write(&path, "[llm]\ntimeout_secs = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    #[serial]
    fn test_api_key_env_fallback() {
        let llm = LlmConfig::default();
        std::env::set_var(API_KEY_ENV, "from-env");
        let key = llm.resolve_api_key();
        std::env::remove_var(API_KEY_ENV);
        assert_eq!(key.as_deref(), Some("from-env"));

        let llm = LlmConfig {
            api_key: Some("configured".to_string()),
            ..LlmConfig::default()
        };
        assert_eq!(llm.resolve_api_key().as_deref(), Some("configured"));
    }
}
