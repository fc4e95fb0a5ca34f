//! Configuration loading, validation, and management for PolicyDraft.
//!
//! Loads configuration from `~/.policydraft/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.policydraft/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the AI endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Where uploaded policy files are kept
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Embedding and generation settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Vector index settings
    #[serde(default)]
    pub vector: VectorConfig,

    /// Chunking and retrieval settings
    #[serde(default)]
    pub rag: RagConfig,

    /// Record persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_upload_dir() -> PathBuf {
    AppConfig::config_dir().join("uploads")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("upload_dir", &self.upload_dir)
            .field("ai", &self.ai)
            .field("vector", &self.vector)
            .field("rag", &self.rag)
            .field("storage", &self.storage)
            .finish()
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// OpenAI-compatible base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_api_base() -> String {
    "http://openai-api:8000/v1".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_generation_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4000
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            embedding_model: default_embedding_model(),
            generation_model: default_generation_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Collection (index file stem) holding policy chunks
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Embedding dimensionality; also the size of the zero-vector fallback
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_collection() -> String {
    "policies".into()
}
fn default_dimensions() -> usize {
    1536
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            dimensions: default_dimensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Maximum characters per policy chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks retrieved per request
    #[serde(default = "default_results_count")]
    pub results_count: usize,
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}
fn default_results_count() -> usize {
    3
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            results_count: default_results_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "file" (JSONL under `data_dir`) or "memory"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_storage_backend() -> String {
    "file".into()
}
fn default_data_dir() -> PathBuf {
    AppConfig::config_dir().join("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            data_dir: default_data_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.policydraft/config.toml).
    ///
    /// Environment variables override file values; see
    /// [`AppConfig::apply_env_overrides`].
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// - `POLICYDRAFT_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `OPENAI_API_BASE`, `EMBEDDING_MODEL`, `GENERATION_MODEL`
    /// - `CHUNK_SIZE`, `CHUNK_OVERLAP`, `RESULTS_COUNT`
    /// - `UPLOAD_DIR`
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(key) = lookup("POLICYDRAFT_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(base) = lookup("OPENAI_API_BASE") {
            self.ai.api_base = base;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.ai.embedding_model = model;
        }
        if let Some(model) = lookup("GENERATION_MODEL") {
            self.ai.generation_model = model;
        }
        if let Some(dir) = lookup("UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }

        let numeric = |key: &str| -> Result<Option<usize>, ConfigError> {
            lookup(key)
                .map(|raw| {
                    raw.trim().parse::<usize>().map_err(|e| {
                        ConfigError::ValidationError(format!("{key} must be a non-negative integer: {e}"))
                    })
                })
                .transpose()
        };
        if let Some(size) = numeric("CHUNK_SIZE")? {
            self.rag.chunk_size = size;
        }
        if let Some(overlap) = numeric("CHUNK_OVERLAP")? {
            self.rag.chunk_overlap = overlap;
        }
        if let Some(count) = numeric("RESULTS_COUNT")? {
            self.rag.results_count = count;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".policydraft")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ConfigError::ValidationError(
                "ai.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.rag.chunk_size == 0 {
            return Err(ConfigError::ValidationError("rag.chunk_size must be > 0".into()));
        }

        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(ConfigError::ValidationError(
                "rag.chunk_overlap must be smaller than rag.chunk_size".into(),
            ));
        }

        if self.rag.results_count == 0 {
            return Err(ConfigError::ValidationError("rag.results_count must be > 0".into()));
        }

        if self.vector.dimensions == 0 {
            return Err(ConfigError::ValidationError("vector.dimensions must be > 0".into()));
        }

        if !matches!(self.storage.backend.as_str(), "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "storage.backend must be \"file\" or \"memory\", got \"{}\"",
                self.storage.backend
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            upload_dir: default_upload_dir(),
            ai: AiConfig::default(),
            vector: VectorConfig::default(),
            rag: RagConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rag.results_count, 3);
        assert_eq!(config.rag.chunk_size, 1000);
        assert_eq!(config.rag.chunk_overlap, 200);
        assert_eq!(config.vector.dimensions, 1536);
        assert_eq!(config.ai.max_tokens, 4000);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.ai.generation_model, config.ai.generation_model);
        assert_eq!(parsed.upload_dir, config.upload_dir);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rag]\nresults_count = 5\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.rag.results_count, 5);
        assert_eq!(config.rag.chunk_size, 1000);
        assert_eq!(config.ai.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn unparsable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rag\nresults_count = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.ai.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let mut config = AppConfig::default();
        config.rag.chunk_overlap = config.rag.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_storage_backend_rejected() {
        let mut config = AppConfig::default();
        config.storage.backend = "redis".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.ai.generation_model, "gpt-3.5-turbo");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                ("OPENAI_API_KEY", "sk-openai"),
                ("GENERATION_MODEL", "gpt-4o"),
                ("RESULTS_COUNT", "7"),
                ("UPLOAD_DIR", "/srv/uploads"),
            ]))
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.ai.generation_model, "gpt-4o");
        assert_eq!(config.rag.results_count, 7);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
    }

    #[test]
    fn project_key_wins_over_openai_key() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                ("OPENAI_API_KEY", "sk-openai"),
                ("POLICYDRAFT_API_KEY", "sk-project"),
            ]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-project"));
    }

    #[test]
    fn non_numeric_env_override_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(env(&[("CHUNK_SIZE", "large")]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-3.5-turbo"));
        assert!(toml_str.contains("results_count"));
    }
}
