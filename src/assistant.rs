//! Query boundary: one free-text query in, an answer and the tools used out.

use crate::agent::{Agent, ChatModel, ConversationMemory, OpenAIChatModel};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::http::create_http_client;
use crate::tools::{ToolRegistry, UsageTracker};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Outcome of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub answer: String,
    /// Distinct tool names invoked while answering, in first-use order.
    pub tools_used: Vec<String>,
}

/// Study assistant wiring a chat model to the standard tools.
///
/// Cheap to share: every query builds its own tracker and agent.
pub struct StudyAssistant {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    prompts: Prompts,
    max_iterations: usize,
}

impl StudyAssistant {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        prompts: Prompts,
        max_iterations: usize,
    ) -> Self {
        Self {
            model,
            tools,
            prompts,
            max_iterations,
        }
    }

    /// Build the assistant from settings: model client, tools and prompts.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = create_http_client(&settings.general)?;
        let tools = ToolRegistry::standard(settings, http);
        let model = Arc::new(OpenAIChatModel::new(&settings.llm)?);
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self::new(model, tools, prompts, settings.llm.max_iterations))
    }

    /// Display names of the available tools, in registry order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer a query given prior conversation turns.
    ///
    /// Never fails: a reasoning-loop error becomes a fallback answer that
    /// embeds the error message.
    #[instrument(skip(self, memory), fields(history = memory.len()))]
    pub async fn ask(&self, query: &str, memory: &ConversationMemory) -> AssistantReply {
        let tracker = UsageTracker::new();
        let agent = Agent::new(self.model.clone(), tracker.wrap(&self.tools), &self.prompts)
            .with_max_iterations(self.max_iterations);

        let task = self.prompts.render_query(query);
        match agent.run(&task, memory).await {
            Ok(response) => {
                info!(
                    "Answered in {} iterations with {} tool calls",
                    response.iterations,
                    response.tool_calls.len()
                );
                AssistantReply {
                    answer: response.content,
                    tools_used: tracker.tools_used(),
                }
            }
            Err(e) => {
                warn!("Reasoning loop failed: {}", e);
                AssistantReply {
                    answer: format!(
                        "I encountered an error: {}. Please try rephrasing your question.",
                        e
                    ),
                    tools_used: tracker.tools_used(),
                }
            }
        }
    }
}
