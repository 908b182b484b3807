//! Configuration settings for Raad.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub embedding: EmbeddingSettings,
    pub insights: InsightSettings,
    pub rag: RagSettings,
    pub completion: CompletionSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.raad".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Insight store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    /// Store provider (sqlite, http, memory).
    pub provider: String,
    /// Path to the SQLite index (for the sqlite provider).
    pub sqlite_path: String,
    /// Matching-service URL (for the http provider).
    pub endpoint: String,
    /// Service-role key sent to the matching service. Server-side only.
    pub service_key: Option<String>,
    /// Relevance floor applied by the local providers.
    pub min_similarity: f64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.raad/insights.db".to_string(),
            endpoint: String::new(),
            service_key: None,
            min_similarity: 0.25,
        }
    }
}

/// Per-field character limits applied when formatting insight context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationLimits {
    pub problem: usize,
    pub solution: usize,
    pub steps: usize,
    pub impact: usize,
    pub quote: usize,
    pub business_context: usize,
}

impl Default for TruncationLimits {
    fn default() -> Self {
        Self {
            problem: 400,
            solution: 400,
            steps: 400,
            impact: 220,
            quote: 160,
            business_context: 220,
        }
    }
}

/// Retrieval-augmentation settings. Read-only for the duration of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Enable insight retrieval. Off means chat runs without context.
    pub enabled: bool,
    /// Maximum number of insights retrieved per request.
    pub match_limit: u32,
    /// Per-field truncation limits for the context block.
    pub truncation: TruncationLimits,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            match_limit: 20,
            truncation: TruncationLimits::default(),
        }
    }
}

/// Completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Default model when the caller does not pick one.
    pub model: String,
    /// Default sampling temperature.
    pub temperature: f32,
    /// Models callers may request. Empty means any model is allowed.
    pub allowed_models: Vec<String>,
    /// API key override; falls back to OPENAI_API_KEY when unset.
    pub api_key: Option<String>,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            allowed_models: Vec::new(),
            api_key: None,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("raad")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite index path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.insights.sqlite_path)
    }
}
