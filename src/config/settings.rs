//! Configuration settings for Studymate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub wikipedia: WikipediaSettings,
    pub youtube: YoutubeSettings,
    pub chat: ChatSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
    /// Timeout for outbound tool requests. None uses the HTTP client default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Language model settings.
///
/// Any OpenAI-compatible chat completions endpoint works; the default points
/// at Gemini's compatibility layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model name.
    pub model: String,
    /// Base URL of the chat completions API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in a model reply.
    pub max_output_tokens: u32,
    /// Maximum reasoning iterations (model calls with tools) per query.
    pub max_iterations: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            temperature: 0.7,
            max_output_tokens: 1024,
            max_iterations: 5,
        }
    }
}

impl LlmSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        read_env_key(&self.api_key_env)
    }
}

/// Web search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Search endpoint URL.
    pub endpoint: String,
    /// Environment variable holding the search API key.
    pub api_key_env: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://serpapi.com/search".to_string(),
            api_key_env: "SERPAPI_API_KEY".to_string(),
        }
    }
}

impl SearchSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        read_env_key(&self.api_key_env)
    }
}

/// Encyclopedia lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaSettings {
    /// MediaWiki Action API endpoint.
    pub endpoint: String,
    /// Sentences in a page summary.
    pub summary_sentences: u32,
    /// Alternatives listed for an ambiguous topic.
    pub max_suggestions: usize,
}

impl Default for WikipediaSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
            summary_sentences: 5,
            max_suggestions: 5,
        }
    }
}

/// YouTube transcript settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Watch page URL used to discover caption tracks.
    pub watch_endpoint: String,
    /// Preferred caption language code.
    pub preferred_language: String,
    /// Sentences kept in a transcript summary.
    pub summary_sentences: usize,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            watch_endpoint: "https://www.youtube.com/watch".to_string(),
            preferred_language: "en".to_string(),
            summary_sentences: 20,
        }
    }
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Prior turns kept in conversation memory.
    pub history_length: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { history_length: 20 }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

fn read_env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|key| !key.trim().is_empty())
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

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::StudymateError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studymate")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}
