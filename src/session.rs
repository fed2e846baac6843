//! Per-user chat session: ordered history plus the memory fed to the model.

use crate::agent::{ConversationMemory, Role};
use crate::assistant::StudyAssistant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reply to a farewell query.
pub const FAREWELL_MESSAGE: &str = "👋 Goodbye! Feel free to return whenever you need assistance.";

const FAREWELLS: [&str; 3] = ["exit", "quit", "bye"];

/// Whether a query ends the conversation.
pub fn is_farewell(query: &str) -> bool {
    let query = query.trim();
    FAREWELLS.iter().any(|f| query.eq_ignore_ascii_case(f))
}

/// One rendered message in the chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tools_used: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, tools_used: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tools_used,
            created_at: Utc::now(),
        }
    }
}

/// Append-only history of one conversation.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    turns: Vec<ChatTurn>,
    memory: ConversationMemory,
    history_length: usize,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    /// Start a session whose model memory keeps `history_length` turns.
    pub fn new(history_length: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
            memory: ConversationMemory::with_limit(history_length),
            history_length,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop all history and memory, keeping the session id.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.memory = ConversationMemory::with_limit(self.history_length);
    }

    /// Handle one user query and return the assistant turn it produced.
    pub async fn submit(&mut self, assistant: &StudyAssistant, query: &str) -> ChatTurn {
        self.turns.push(ChatTurn::user(query));

        let turn = if is_farewell(query) {
            ChatTurn::assistant(FAREWELL_MESSAGE, Vec::new())
        } else {
            let reply = assistant.ask(query, &self.memory).await;
            self.memory.record_exchange(query, &reply.answer);
            ChatTurn::assistant(reply.answer, reply.tools_used)
        };

        self.turns.push(turn.clone());
        turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_support::ScriptedModel;
    use crate::config::{Prompts, Settings};
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    fn assistant(model: Arc<ScriptedModel>) -> StudyAssistant {
        StudyAssistant::new(
            model,
            ToolRegistry::standard(&Settings::default(), reqwest::Client::new()),
            Prompts::default(),
            5,
        )
    }

    #[test]
    fn test_is_farewell() {
        assert!(is_farewell("exit"));
        assert!(is_farewell("  Quit "));
        assert!(is_farewell("BYE"));
        assert!(!is_farewell("goodbye"));
        assert!(!is_farewell("bye now"));
    }

    #[tokio::test]
    async fn test_farewell_skips_assistant() {
        let model = Arc::new(ScriptedModel::new());
        let assistant = assistant(model.clone());
        let mut session = ChatSession::new(20);

        let turn = session.submit(&assistant, "Bye").await;

        assert_eq!(turn.content, FAREWELL_MESSAGE);
        assert!(model.calls().is_empty());
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[0].role, Role::User);
        assert!(session.memory().is_empty());
    }

    #[tokio::test]
    async fn test_submit_appends_turns_and_memory() {
        let model = Arc::new(ScriptedModel::new().then_text("Cells divide.").then_text("More."));
        let assistant = assistant(model.clone());
        let mut session = ChatSession::new(20);

        let first = session.submit(&assistant, "What is mitosis?").await;
        assert_eq!(first.role, Role::Assistant);
        assert_eq!(first.content, "Cells divide.");
        assert_eq!(session.memory().len(), 2);

        session.submit(&assistant, "Tell me more").await;
        assert_eq!(session.turns().len(), 4);

        // Second call sees the first exchange before the new query
        let messages = &model.calls()[1].messages;
        assert_eq!(messages[1]["content"], "What is mitosis?");
        assert_eq!(messages[2]["content"], "Cells divide.");
    }

    #[tokio::test]
    async fn test_clear_keeps_id() {
        let model = Arc::new(ScriptedModel::new().then_text("Hi"));
        let assistant = assistant(model);
        let mut session = ChatSession::new(4);
        let id = session.id();

        session.submit(&assistant, "hello").await;
        session.clear();

        assert!(session.is_empty());
        assert!(session.memory().is_empty());
        assert_eq!(session.id(), id);
    }

    #[test]
    fn test_turn_serialization() {
        let turn = ChatTurn::assistant("answer", vec!["Wikipedia Tool".to_string()]);
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["tools_used"][0], "Wikipedia Tool");

        let user = serde_json::to_value(ChatTurn::user("q")).unwrap();
        assert!(user.get("tools_used").is_none());
    }
}
