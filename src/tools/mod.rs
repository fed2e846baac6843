//! Study tools exposed to the reasoning loop.
//!
//! Every tool takes one free-text input and returns one string. Tools never
//! fail: provider, credential and input errors come back as readable text so a
//! single bad response cannot abort a query.

mod registry;
mod search;
mod study;
mod tracker;
mod wikipedia;
mod youtube;

pub use registry::{tool_names, ToolRegistry, TOOL_NAMES};
pub use search::{Author, OrganicResult, PublicationInfo, SearchClient, SearchEngine};
pub use study::{SearchKind, SearchTool};
pub use tracker::{TrackedTool, UsageTracker};
pub use wikipedia::{WikiArticle, WikiLookup, WikipediaClient, WikipediaTool};
pub use youtube::{
    extract_video_id, summarize_transcript, TranscriptProvider, TranscriptSegment,
    YoutubeSummaryTool, YoutubeTranscriptFetcher,
};

use async_trait::async_trait;

/// A named, single-input/single-output capability.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Display name, unique within a registry (e.g. "Wikipedia Tool").
    fn name(&self) -> &str;

    /// Description the model uses to decide applicability.
    fn description(&self) -> &str;

    /// Run the tool. Always returns a non-empty string.
    async fn invoke(&self, input: &str) -> String;
}

/// Function identifier for a tool display name ("Wikipedia Tool" -> "wikipedia_tool").
pub fn function_name(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Extract the tool input from model-supplied call arguments.
///
/// Accepts `{"input": "..."}`, a bare JSON string, or plain text.
pub fn parse_tool_input(arguments: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(arguments) {
        Ok(serde_json::Value::Object(map)) => match map.get("input") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            // Fall back to the first string argument the model chose to send
            None => map
                .values()
                .find_map(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
        },
        Ok(serde_json::Value::String(s)) => s,
        _ => arguments.trim().to_string(),
    }
}
