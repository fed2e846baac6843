//! Studymate - a study and research companion
//!
//! A chat agent that answers students' questions by letting a language model
//! consult a fixed set of study tools.
//!
//! # Overview
//!
//! Studymate allows you to:
//! - Look up encyclopedia summaries with their source links
//! - Search the web and scholarly literature
//! - Summarize educational YouTube videos from their transcripts
//! - Get study tips, exam strategies, flashcards, note outlines, concept maps
//!   and expert insights on a topic
//!
//! Every answer comes with the list of tools that contributed to it.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `tools` - The tool contract, the ten study tools, the registry and the usage tracker
//! - `agent` - Chat model seam, conversation memory and the tool-calling loop
//! - `assistant` - Query boundary returning an answer and the tools used
//! - `session` - Per-user chat history
//!
//! # Example
//!
//! ```rust,no_run
//! use studymate::agent::ConversationMemory;
//! use studymate::assistant::StudyAssistant;
//! use studymate::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let assistant = StudyAssistant::from_settings(&settings)?;
//!
//!     let reply = assistant.ask("photosynthesis", &ConversationMemory::new()).await;
//!     println!("{}", reply.answer);
//!     println!("Tools used: {}", reply.tools_used.join(", "));
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod openai;
pub mod session;
pub mod tools;

pub use error::{Result, StudymateError};
