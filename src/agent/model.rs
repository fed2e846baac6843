//! Chat model seam used by the reasoning loop.

use crate::config::LlmSettings;
use crate::error::{Result, StudymateError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionTool, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::debug;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelToolCall {
    pub id: String,
    /// Function name as advertised in the tool definitions.
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

/// One model turn: either text, tool calls, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ModelToolCall>,
}

impl ModelReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// A chat completion backend that may request tool calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete a conversation. An empty `tools` slice disables tool calling.
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<ModelReply>;
}

/// Chat model served over an OpenAI-compatible chat completions endpoint.
pub struct OpenAIChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl OpenAIChatModel {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<ModelReply> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages.to_vec())
            .temperature(self.temperature)
            .max_completion_tokens(self.max_output_tokens);
        if !tools.is_empty() {
            args.tools(tools.to_vec());
        }
        let request = args
            .build()
            .map_err(|e| StudymateError::Agent(e.to_string()))?;

        debug!(
            "Chat completion: model={}, messages={}, tools={}",
            self.model,
            messages.len(),
            tools.len()
        );

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| StudymateError::OpenAI(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| StudymateError::Agent("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ModelToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ModelReply {
            content: choice.message.content,
            tool_calls,
        })
    }
}
