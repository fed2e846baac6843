//! Error types for Studymate.

use thiserror::Error;

/// Library-level error type for Studymate operations.
#[derive(Error, Debug)]
pub enum StudymateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing {provider} key. Please set the {env_var} environment variable.")]
    MissingCredential {
        provider: &'static str,
        env_var: String,
    },

    #[error("{provider} returned status code {status}")]
    ProviderStatus { provider: &'static str, status: u16 },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for Studymate operations.
pub type Result<T> = std::result::Result<T, StudymateError>;
