//! Bounded conversation memory replayed to the model on every query.

use crate::error::{Result, StudymateError};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestUserMessageArgs,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MemoryEntry {
    role: Role,
    content: String,
}

/// Prior turns of one conversation, oldest first.
///
/// When a limit is set, the oldest turns are dropped once it is exceeded.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    entries: VecDeque<MemoryEntry>,
    limit: Option<usize>,
}

impl ConversationMemory {
    /// Unbounded, empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty memory keeping at most `limit` turns.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: Some(limit),
        }
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.entries.push_back(MemoryEntry {
            role,
            content: content.into(),
        });
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
    }

    /// Remember a completed query/answer pair.
    pub fn record_exchange(&mut self, query: &str, answer: &str) {
        self.push(Role::User, query);
        self.push(Role::Assistant, answer);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Turns as (role, content) pairs, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = (Role, &str)> {
        self.entries.iter().map(|e| (e.role, e.content.as_str()))
    }

    /// Turns as chat completion messages.
    pub fn to_messages(&self) -> Result<Vec<ChatCompletionRequestMessage>> {
        self.entries
            .iter()
            .map(|entry| {
                let message: ChatCompletionRequestMessage = match entry.role {
                    Role::User => ChatCompletionRequestUserMessageArgs::default()
                        .content(entry.content.clone())
                        .build()
                        .map_err(|e| StudymateError::Agent(e.to_string()))?
                        .into(),
                    Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                        .content(entry.content.clone())
                        .build()
                        .map_err(|e| StudymateError::Agent(e.to_string()))?
                        .into(),
                };
                Ok(message)
            })
            .collect()
    }
}
