//! Fixed, ordered registry of study tools.

use super::search::SearchClient;
use super::study::{SearchKind, SearchTool};
use super::wikipedia::{WikipediaClient, WikipediaTool};
use super::youtube::{YoutubeSummaryTool, YoutubeTranscriptFetcher};
use super::{function_name, Tool};
use crate::config::Settings;
use crate::error::{Result, StudymateError};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use std::collections::HashSet;
use std::sync::Arc;

/// Display names of the standard tools, in registry order.
pub const TOOL_NAMES: [&str; 10] = [
    "Wikipedia Tool",
    "Study Tips Tool",
    "Google Search Tool",
    "YouTube Summary Tool",
    "Exam Strategy Tool",
    "Flashcard Generator Tool",
    "Note Organizer Tool",
    "Concept Mapper Tool",
    "Scholarly Papers Tool",
    "Subject Expert Tool",
];

/// Names of the standard tools, for display.
pub fn tool_names() -> Vec<&'static str> {
    TOOL_NAMES.to_vec()
}

/// Ordered collection of tools, addressable by display name or function name.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if !seen.insert(function_name(tool.name())) {
                return Err(StudymateError::InvalidInput(format!(
                    "Duplicate tool name: {}",
                    tool.name()
                )));
            }
        }
        Ok(Self { tools })
    }

    /// The ten standard study tools, wired to their providers.
    pub fn standard(settings: &Settings, http: reqwest::Client) -> Self {
        let search = Arc::new(SearchClient::from_settings(http.clone(), &settings.search));
        let wikipedia = Arc::new(WikipediaClient::new(http.clone(), &settings.wikipedia));
        let transcripts = Arc::new(YoutubeTranscriptFetcher::new(http, &settings.youtube));

        let search_tool =
            |kind: SearchKind| -> Arc<dyn Tool> { Arc::new(SearchTool::new(kind, search.clone())) };

        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(WikipediaTool::new(wikipedia)),
            search_tool(SearchKind::StudyTips),
            search_tool(SearchKind::WebSearch),
            Arc::new(YoutubeSummaryTool::new(
                transcripts,
                settings.youtube.summary_sentences,
            )),
            search_tool(SearchKind::ExamStrategy),
            search_tool(SearchKind::Flashcards),
            search_tool(SearchKind::NoteOrganizer),
            search_tool(SearchKind::ConceptMap),
            search_tool(SearchKind::ScholarlyPapers),
            search_tool(SearchKind::SubjectExpert),
        ];

        Self { tools }
    }

    /// Tool display names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    /// Look up a tool by display name or function name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        let wanted = function_name(name);
        self.tools
            .iter()
            .find(|t| t.name() == name || function_name(t.name()) == wanted)
    }

    /// Apply a wrapper to every tool, keeping order.
    pub fn map_tools<F>(&self, wrap: F) -> Self
    where
        F: Fn(Arc<dyn Tool>) -> Arc<dyn Tool>,
    {
        Self {
            tools: self.tools.iter().cloned().map(wrap).collect(),
        }
    }

    /// Function definitions for the chat completions API.
    pub fn definitions(&self) -> Vec<ChatCompletionTool> {
        self.tools
            .iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: function_name(tool.name()),
                    description: Some(tool.description().to_string()),
                    parameters: Some(serde_json::json!({
                        "type": "object",
                        "properties": {
                            "input": {
                                "type": "string",
                                "description": "Free-text input: a topic, question, or YouTube URL/ID"
                            }
                        },
                        "required": ["input"]
                    })),
                    strict: None,
                },
            })
            .collect()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
