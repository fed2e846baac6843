//! Ask command implementation.

use crate::agent::ConversationMemory;
use crate::assistant::StudyAssistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(query: &str, model: Option<String>, mut settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'studymate doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.llm.model = model;
    }

    let assistant = StudyAssistant::from_settings(&settings)?;

    let spinner = Output::spinner("Thinking...");
    let reply = assistant.ask(query, &ConversationMemory::new()).await;
    spinner.finish_and_clear();

    Output::answer(&reply.answer);
    Output::tools_used(&reply.tools_used);

    Ok(())
}
