//! Scripted chat model for exercising the reasoning loop without a provider.

use super::model::{ChatModel, ModelReply, ModelToolCall};
use crate::error::{Result, StudymateError};
use async_openai::types::{ChatCompletionRequestMessage, ChatCompletionTool};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// What the model saw on one call.
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub messages: Value,
    pub tool_count: usize,
}

impl SeenCall {
    /// Content of the most recent tool result message, if any.
    pub fn last_tool_result(&self) -> Option<String> {
        self.messages
            .as_array()?
            .iter()
            .rev()
            .find(|m| m["role"] == "tool")
            .and_then(|m| m["content"].as_str())
            .map(str::to_string)
    }
}

type Step = Box<dyn Fn(&SeenCall) -> Result<ModelReply> + Send + Sync>;

/// Model that replays a fixed script of replies.
#[derive(Default)]
pub struct ScriptedModel {
    steps: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<SeenCall>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then<F>(self, step: F) -> Self
    where
        F: Fn(&SeenCall) -> Result<ModelReply> + Send + Sync + 'static,
    {
        self.steps.lock().unwrap().push_back(Box::new(step));
        self
    }

    pub fn then_tool(self, name: &str, input: &str) -> Self {
        let call = tool_call(name, input);
        self.then(move |_| {
            Ok(ModelReply {
                content: None,
                tool_calls: vec![call.clone()],
            })
        })
    }

    pub fn then_text(self, text: &str) -> Self {
        let text = text.to_string();
        self.then(move |_| Ok(ModelReply::text(text.clone())))
    }

    pub fn then_error(self, message: &str) -> Self {
        let message = message.to_string();
        self.then(move |_| Err(StudymateError::OpenAI(message.clone())))
    }

    pub fn calls(&self) -> Vec<SeenCall> {
        self.seen.lock().unwrap().clone()
    }
}

pub fn tool_call(name: &str, input: &str) -> ModelToolCall {
    ModelToolCall {
        id: format!("call_{}", name),
        name: name.to_string(),
        arguments: serde_json::json!({ "input": input }).to_string(),
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<ModelReply> {
        let call = SeenCall {
            messages: serde_json::to_value(messages)?,
            tool_count: tools.len(),
        };
        self.seen.lock().unwrap().push(call.clone());

        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| StudymateError::Agent("script exhausted".to_string()))?;
        step(&call)
    }
}
