//! Agent runner with tool calling loop.

use super::memory::ConversationMemory;
use super::model::{ChatModel, ModelReply, ModelToolCall};
use crate::config::Prompts;
use crate::error::{Result, StudymateError};
use crate::tools::{parse_tool_input, ToolRegistry};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionToolType, FunctionCall,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default cap on model calls that may request tools.
const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Agent that answers a task by letting the model call study tools.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    max_iterations: usize,
    system_prompt: String,
    final_answer_prompt: String,
}

impl Agent {
    /// Create a new agent over a model and a set of tools.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry, prompts: &Prompts) -> Self {
        Self {
            model,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt: prompts.render_system(),
            final_answer_prompt: prompts.agent.final_answer.clone(),
        }
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run the agent with a user task, replaying prior turns from memory.
    pub async fn run(&self, task: &str, memory: &ConversationMemory) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| StudymateError::Agent(e.to_string()))?
                .into(),
        ];
        messages.extend(memory.to_messages()?);
        messages.push(user_message(task)?);

        let definitions = self.tools.definitions();
        let mut tool_calls_made = Vec::new();

        for iteration in 1..=self.max_iterations {
            debug!("Agent iteration {}", iteration);

            let reply = self.model.complete(&messages, &definitions).await?;
            if reply.tool_calls.is_empty() {
                return Ok(build_response(reply, tool_calls_made, iteration));
            }

            messages.push(assistant_tool_message(&reply)?);

            for tool_call in &reply.tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| StudymateError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }

        // Out of tool steps: one last call without tools forces an answer
        warn!(
            "Agent reached maximum iterations ({}), generating final answer",
            self.max_iterations
        );
        messages.push(user_message(&self.final_answer_prompt)?);
        let reply = self.model.complete(&messages, &[]).await?;

        match reply.content.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(build_response(
                reply,
                tool_calls_made,
                self.max_iterations + 1,
            )),
            _ => Err(StudymateError::Agent(format!(
                "Agent stopped after {} iterations without a final answer",
                self.max_iterations
            ))),
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, tool_call: &ModelToolCall) -> ToolCallRecord {
        let name = &tool_call.name;
        let arguments = &tool_call.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let (name, result) = match self.tools.get(name) {
            Some(tool) => {
                let input = parse_tool_input(arguments);
                (tool.name().to_string(), tool.invoke(&input).await)
            }
            None => {
                warn!("Model requested unknown tool: {}", name);
                (name.clone(), format!("Unknown tool: {}", name))
            }
        };

        ToolCallRecord {
            name,
            arguments: arguments.clone(),
            result,
        }
    }
}

fn user_message(content: &str) -> Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(content.to_string())
        .build()
        .map_err(|e| StudymateError::Agent(e.to_string()))?
        .into())
}

fn assistant_tool_message(reply: &ModelReply) -> Result<ChatCompletionRequestMessage> {
    let tool_calls: Vec<ChatCompletionMessageToolCall> = reply
        .tool_calls
        .iter()
        .map(|call| ChatCompletionMessageToolCall {
            id: call.id.clone(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        })
        .collect();

    let mut args = ChatCompletionRequestAssistantMessageArgs::default();
    args.tool_calls(tool_calls);
    if let Some(content) = reply.content.as_ref().filter(|c| !c.is_empty()) {
        args.content(content.clone());
    }

    Ok(args
        .build()
        .map_err(|e| StudymateError::Agent(e.to_string()))?
        .into())
}

/// Build the final agent response.
fn build_response(
    reply: ModelReply,
    tool_calls: Vec<ToolCallRecord>,
    iterations: usize,
) -> AgentResponse {
    AgentResponse {
        content: reply.content.unwrap_or_default(),
        tool_calls,
        iterations,
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Display name of the tool called, or the raw name if unknown.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
