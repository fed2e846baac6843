//! Chat completions client configuration.

use crate::config::LlmSettings;
use crate::error::{Result, StudymateError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for chat completion requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create a client for the configured OpenAI-compatible endpoint.
///
/// The API key is read from the environment variable named in the settings.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(settings, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a client with a custom timeout.
pub fn create_client_with_timeout(
    settings: &LlmSettings,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| StudymateError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::new().with_api_base(&settings.api_base);
    if let Some(key) = settings.api_key() {
        config = config.with_api_key(key);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
