//! Shared HTTP client for tool providers.

use crate::config::GeneralSettings;
use crate::error::{Result, StudymateError};
use std::time::Duration;

/// User agent sent with every provider request.
pub const USER_AGENT: &str = concat!("studymate/", env!("CARGO_PKG_VERSION"));

/// Create the HTTP client used by all tools.
///
/// No timeout is set unless `request_timeout_secs` is configured.
pub fn create_http_client(settings: &GeneralSettings) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(secs) = settings.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| StudymateError::Config(format!("Failed to create HTTP client: {}", e)))
}
