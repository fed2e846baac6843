//! Reasoning loop that lets a chat model call study tools.
//!
//! The model sees the system prompt, prior conversation turns and the wrapped
//! query, then decides which tools to call until it can answer.

mod memory;
mod model;
mod runner;

#[cfg(test)]
pub(crate) mod test_support;

pub use memory::{ConversationMemory, Role};
pub use model::{ChatModel, ModelReply, ModelToolCall, OpenAIChatModel};
pub use runner::{Agent, AgentResponse, ToolCallRecord};
