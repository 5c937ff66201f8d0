//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/faq.sqlite"
//!
//! [matcher]
//! max_features = 5000
//!
//! [chat]
//! min_confidence = 0.3
//!
//! [embedding]
//! provider = "local"
//! model = "all-minilm-l6-v2"
//!
//! [server]
//! bind = "127.0.0.1:5000"
//! ```
//!
//! Only `[db]` and `[server]` are required; every other section has
//! defaults.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use faq_harness_core::lexical::{DEFAULT_MAX_FEATURES, LEXICAL_THRESHOLD};
use faq_harness_core::matcher::MatcherParams;
use faq_harness_core::semantic::SEMANTIC_THRESHOLD;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatcherConfig {
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    #[serde(default = "default_lexical_threshold")]
    pub lexical_threshold: f64,
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            lexical_threshold: default_lexical_threshold(),
            semantic_threshold: default_semantic_threshold(),
        }
    }
}

impl MatcherConfig {
    pub fn params(&self) -> MatcherParams {
        MatcherParams {
            max_features: self.max_features,
            lexical_threshold: self.lexical_threshold,
            semantic_threshold: self.semantic_threshold,
        }
    }
}

fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}
fn default_lexical_threshold() -> f64 {
    LEXICAL_THRESHOLD
}
fn default_semantic_threshold() -> f64 {
    SEMANTIC_THRESHOLD
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Final cutoff: a match must have confidence strictly above this.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_fallback_response")]
    pub fallback_response: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: i64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            fallback_response: default_fallback_response(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_min_confidence() -> f64 {
    0.3
}
fn default_fallback_response() -> String {
    "I'm sorry, I couldn't find a good match for your question. Please try rephrasing or contact support for more specific queries.".to_string()
}
fn default_history_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            url: None,
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Read, parse, and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Check value ranges and provider requirements.
pub fn validate(config: &Config) -> Result<()> {
    if config.matcher.max_features == 0 {
        bail!("matcher.max_features must be > 0");
    }
    if !(0.0..=1.0).contains(&config.matcher.lexical_threshold) {
        bail!("matcher.lexical_threshold must be in [0.0, 1.0]");
    }
    if !(0.0..=1.0).contains(&config.matcher.semantic_threshold) {
        bail!("matcher.semantic_threshold must be in [0.0, 1.0]");
    }
    if !(0.0..=1.0).contains(&config.chat.min_confidence) {
        bail!("chat.min_confidence must be in [0.0, 1.0]");
    }
    if config.chat.history_limit < 1 {
        bail!("chat.history_limit must be >= 1");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "local" => {}
        "openai" | "ollama" => {
            if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
                bail!(
                    "embedding.dims must be > 0 when provider is '{}'",
                    config.embedding.provider
                );
            }
            if config.embedding.model.is_none() {
                bail!(
                    "embedding.model must be specified when provider is '{}'",
                    config.embedding.provider
                );
            }
        }
        other => bail!(
            "Unknown embedding provider: '{}'. Must be disabled, openai, ollama, or local.",
            other
        ),
    }

    Ok(())
}
