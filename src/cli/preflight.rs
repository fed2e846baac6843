//! Pre-flight checks before expensive operations.
//!
//! Validates that required credentials are available before starting
//! operations that would otherwise fail on the first model call.

use crate::config::Settings;
use crate::error::{Result, StudymateError};
use tracing::warn;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chat and ask need the LLM key; search tools degrade without theirs.
    Query,
    /// Running a single tool needs no LLM.
    Tool,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Query => {
            check_llm_key(settings)?;
            if settings.search.api_key().is_none() {
                warn!(
                    "{} not set; search-based tools will report a missing key",
                    settings.search.api_key_env
                );
            }
        }
        Operation::Tool => {}
    }
    Ok(())
}

/// Check that the LLM API key is configured.
fn check_llm_key(settings: &Settings) -> Result<()> {
    match settings.llm.api_key() {
        Some(_) => Ok(()),
        None => Err(StudymateError::Config(format!(
            "{env} not set. Set it with: export {env}='...'",
            env = settings.llm.api_key_env
        ))),
    }
}
