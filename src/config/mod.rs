//! Configuration module for Studymate.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, Prompts};
pub use settings::{
    ChatSettings, GeneralSettings, LlmSettings, PromptSettings, SearchSettings, Settings,
    WikipediaSettings, YoutubeSettings,
};
