//! Search-backed study tools.
//!
//! Each kind derives a search query from the user's topic, asks the search
//! provider for the top results and lays them out in a fixed template.

use super::search::{OrganicResult, SearchClient, SearchEngine};
use super::Tool;
use crate::error::{Result, StudymateError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Snippet length kept in concept map branches.
const BRANCH_SNIPPET_CHARS: usize = 150;

/// The search-backed tools, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    StudyTips,
    WebSearch,
    ExamStrategy,
    Flashcards,
    NoteOrganizer,
    ConceptMap,
    ScholarlyPapers,
    SubjectExpert,
}

impl SearchKind {
    pub const ALL: [SearchKind; 8] = [
        SearchKind::StudyTips,
        SearchKind::WebSearch,
        SearchKind::ExamStrategy,
        SearchKind::Flashcards,
        SearchKind::NoteOrganizer,
        SearchKind::ConceptMap,
        SearchKind::ScholarlyPapers,
        SearchKind::SubjectExpert,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SearchKind::StudyTips => "Study Tips Tool",
            SearchKind::WebSearch => "Google Search Tool",
            SearchKind::ExamStrategy => "Exam Strategy Tool",
            SearchKind::Flashcards => "Flashcard Generator Tool",
            SearchKind::NoteOrganizer => "Note Organizer Tool",
            SearchKind::ConceptMap => "Concept Mapper Tool",
            SearchKind::ScholarlyPapers => "Scholarly Papers Tool",
            SearchKind::SubjectExpert => "Subject Expert Tool",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SearchKind::StudyTips => {
                "Provide personalized study tips for different subjects and learning styles."
            }
            SearchKind::WebSearch => "Search Google for recent academic information and facts.",
            SearchKind::ExamStrategy => {
                "Get specific tips for different exam formats: MCQ, theory, practical, or viva."
            }
            SearchKind::Flashcards => {
                "Generate study flashcards for any topic with question-answer pairs."
            }
            SearchKind::NoteOrganizer => {
                "Organize and structure study notes for better comprehension."
            }
            SearchKind::ConceptMap => {
                "Create concept maps showing relationships between ideas for visual learning."
            }
            SearchKind::ScholarlyPapers => "Find and summarize academic papers on a given topic.",
            SearchKind::SubjectExpert => {
                "Get specialized help from virtual subject matter experts in various fields."
            }
        }
    }

    /// Query sent to the search provider for a topic.
    pub fn search_query(&self, topic: &str) -> String {
        match self {
            SearchKind::StudyTips => format!("study tips for {}", topic),
            SearchKind::WebSearch => topic.to_string(),
            SearchKind::ExamStrategy => format!("exam strategies for {}", topic),
            SearchKind::Flashcards => format!("key concepts {} for flashcards", topic),
            SearchKind::NoteOrganizer => format!("how to organize study notes for {}", topic),
            SearchKind::ConceptMap => format!("main concepts related to {}", topic),
            SearchKind::ScholarlyPapers => format!("scholarly papers on {}", topic),
            SearchKind::SubjectExpert => format!("expert insights on {}", topic),
        }
    }

    pub fn engine(&self) -> SearchEngine {
        match self {
            SearchKind::ScholarlyPapers => SearchEngine::GoogleScholar,
            _ => SearchEngine::Google,
        }
    }

    /// Number of results requested and formatted.
    pub fn result_count(&self) -> usize {
        match self {
            SearchKind::StudyTips | SearchKind::NoteOrganizer | SearchKind::SubjectExpert => 3,
            _ => 5,
        }
    }

    /// What the tool fetches, as used in status-code failures.
    fn subject(&self) -> &'static str {
        match self {
            SearchKind::StudyTips => "study tips",
            SearchKind::WebSearch => "search results",
            SearchKind::ExamStrategy => "exam strategies",
            SearchKind::Flashcards => "flashcard content",
            SearchKind::NoteOrganizer => "note organization tips",
            SearchKind::ConceptMap => "concept data",
            SearchKind::ScholarlyPapers => "scholarly papers",
            SearchKind::SubjectExpert => "expert insights",
        }
    }

    fn error_prefix(&self) -> &'static str {
        match self {
            SearchKind::StudyTips => "Error fetching study tips",
            SearchKind::WebSearch => "Error performing search",
            SearchKind::ExamStrategy => "Error fetching exam strategies",
            SearchKind::Flashcards => "Error generating flashcards",
            SearchKind::NoteOrganizer => "Error organizing notes",
            SearchKind::ConceptMap => "Error creating concept map",
            SearchKind::ScholarlyPapers => "Error fetching scholarly papers",
            SearchKind::SubjectExpert => "Error connecting with subject experts",
        }
    }

    /// Message for an empty result set. Always names the topic.
    pub fn no_results(&self, topic: &str) -> String {
        match self {
            SearchKind::StudyTips => format!(
                "No study tips found for {}. Try a different subject or topic.",
                topic
            ),
            SearchKind::WebSearch => format!("No search results found for '{}'.", topic),
            SearchKind::ExamStrategy => format!(
                "No exam strategies found for {}. Try a different exam type or subject.",
                topic
            ),
            SearchKind::Flashcards => format!(
                "No content found for {} flashcards. Try a different subject or topic.",
                topic
            ),
            SearchKind::NoteOrganizer => format!(
                "No note organization tips found for {}. Try a different subject or topic.",
                topic
            ),
            SearchKind::ConceptMap => format!(
                "No concept data found for {}. Try a different subject or topic.",
                topic
            ),
            SearchKind::ScholarlyPapers => format!(
                "No scholarly papers found for {}. Try a different academic topic.",
                topic
            ),
            SearchKind::SubjectExpert => format!(
                "No expert insights found for {}. Try a different subject or topic.",
                topic
            ),
        }
    }

    /// Convert a failure into the tool's output text.
    pub fn failure_message(&self, error: &StudymateError) -> String {
        match error {
            StudymateError::MissingCredential { .. } => error.to_string(),
            StudymateError::ProviderStatus { status, .. } => format!(
                "Failed to fetch {}. Status code: {}",
                self.subject(),
                status
            ),
            other => format!("{}: {}", self.error_prefix(), other),
        }
    }

    /// Lay out the results in the tool's template.
    pub fn format(&self, topic: &str, results: &[OrganicResult]) -> String {
        match self {
            SearchKind::StudyTips => {
                bullet_list("🎯 Study Tips:\n\n".to_string(), results, "Study tip")
            }
            SearchKind::ExamStrategy => bullet_list(
                format!("📘 Exam Strategies for {}:\n\n", topic),
                results,
                "Strategy",
            ),
            SearchKind::WebSearch => {
                let formatted = results
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        format!(
                            "{}. **{}**\n   {}\n   URL: {}",
                            i + 1,
                            r.title().unwrap_or("No title"),
                            r.snippet().unwrap_or("No description"),
                            r.link().unwrap_or("No link")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n");
                format!("🔍 Search Results:\n\n{}", formatted)
            }
            SearchKind::Flashcards => {
                let mut out = format!("📇 Flashcards for {}:\n\n", topic);
                for (i, r) in results.iter().enumerate() {
                    let title = title_or(r, format!("Concept {}", i + 1));
                    out.push_str(&format!(
                        "**Card {}**\nQ: What is {}?\nA: {}\n\n",
                        i + 1,
                        headline(&title),
                        r.snippet().unwrap_or("No description available")
                    ));
                }
                out
            }
            SearchKind::NoteOrganizer => {
                let mut out = format!("# 📝 Organized Study Notes for {}\n\n", topic);
                out.push_str("## Key Concepts\n");
                for (i, r) in results.iter().enumerate() {
                    let title = title_or(r, format!("Concept {}", i + 1));
                    out.push_str(&format!(
                        "### {}\n{}\n\n",
                        headline(&title),
                        r.snippet().unwrap_or("No information available")
                    ));
                }
                out.push_str("## Study Organization Tips\n");
                out.push_str("- Create a study schedule with specific goals for each session\n");
                out.push_str("- Use headings and subheadings to structure your notes\n");
                out.push_str("- Review and revise notes regularly\n");
                out.push_str("- Connect concepts with arrows or mind maps\n");
                out.push_str("- Highlight key definitions and formulas\n\n");
                out
            }
            SearchKind::ConceptMap => {
                let mut out = format!("🔄 Concept Map for {}:\n\n", topic);
                out.push_str(&format!("## Central Concept: {}\n\n", topic.to_uppercase()));
                for (i, r) in results.iter().enumerate() {
                    let title = title_or(r, format!("Related Concept {}", i + 1));
                    let snippet: String = r
                        .snippet()
                        .unwrap_or("No description available")
                        .chars()
                        .take(BRANCH_SNIPPET_CHARS)
                        .collect();
                    out.push_str(&format!(
                        "### Branch {}: {}\n{}...\n\n",
                        i + 1,
                        headline(&title),
                        snippet
                    ));
                }
                out.push_str("To create a visual concept map:\n");
                out.push_str("1. Place the central concept in the middle\n");
                out.push_str("2. Connect related concepts with lines\n");
                out.push_str("3. Add brief descriptions on the connecting lines\n");
                out.push_str("4. Use different colors for different categories of concepts\n");
                out
            }
            SearchKind::ScholarlyPapers => {
                let mut out = format!("📄 Scholarly Papers on {}:\n\n", topic);
                for (i, r) in results.iter().enumerate() {
                    let title = title_or(r, format!("Paper {}", i + 1));
                    let authors = r.authors();
                    let authors_text = if authors.is_empty() {
                        "Unknown authors".to_string()
                    } else {
                        authors.join(", ")
                    };
                    out.push_str(&format!(
                        "**{}. {}**\nAuthors: {}\nAbstract: {}\n\n",
                        i + 1,
                        title,
                        authors_text,
                        r.snippet().unwrap_or("No abstract available")
                    ));
                }
                out
            }
            SearchKind::SubjectExpert => {
                let mut out = format!("🎓 Expert Insights on {}:\n\n", topic);
                for (i, r) in results.iter().enumerate() {
                    let title = title_or(r, format!("Insight {}", i + 1));
                    out.push_str(&format!(
                        "**Expert Point {}**: {}\n{}\n\n",
                        i + 1,
                        title,
                        r.snippet().unwrap_or("No information available")
                    ));
                }
                out.push_str("For deeper expertise, consider:\n");
                out.push_str("- Consulting specialized textbooks\n");
                out.push_str("- Finding subject-specific academic journals\n");
                out.push_str("- Attending relevant webinars or lectures\n");
                out
            }
        }
    }
}

fn bullet_list(mut out: String, results: &[OrganicResult], fallback_title: &str) -> String {
    for r in results {
        out.push_str(&format!("• {}\n", r.title().unwrap_or(fallback_title)));
        if let Some(snippet) = r.snippet() {
            out.push_str(&format!("  {}\n\n", snippet));
        }
    }
    out
}

fn title_or(result: &OrganicResult, fallback: String) -> String {
    result.title().map(str::to_string).unwrap_or(fallback)
}

/// Leading part of a "Topic - Site name" style title.
fn headline(title: &str) -> &str {
    match title.split_once(" - ") {
        Some((head, _)) => head,
        None => title,
    }
}

/// A search-backed study tool.
pub struct SearchTool {
    kind: SearchKind,
    client: Arc<SearchClient>,
}

impl SearchTool {
    pub fn new(kind: SearchKind, client: Arc<SearchClient>) -> Self {
        Self { kind, client }
    }

    async fn run(&self, topic: &str) -> Result<String> {
        let count = self.kind.result_count();
        let results = self
            .client
            .search(&self.kind.search_query(topic), self.kind.engine(), count)
            .await?;

        if results.is_empty() {
            return Ok(self.kind.no_results(topic));
        }

        let top = &results[..results.len().min(count)];
        Ok(self.kind.format(topic, top))
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    #[instrument(skip(self), fields(tool = self.kind.name()))]
    async fn invoke(&self, input: &str) -> String {
        info!("Running {}", self.kind.name());
        match self.run(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!("{} failed: {}", self.kind.name(), e);
                self.kind.failure_message(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool(kind: SearchKind, server: &MockServer, key: Option<&str>) -> SearchTool {
        let client = SearchClient::new(
            reqwest::Client::new(),
            &format!("{}/search", server.uri()),
            key.map(str::to_string),
            "SERPAPI_API_KEY",
        );
        SearchTool::new(kind, Arc::new(client))
    }

    fn result(title: &str, snippet: &str) -> OrganicResult {
        OrganicResult {
            title: Some(title.to_string()),
            snippet: Some(snippet.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_every_kind_reports_missing_key_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for kind in SearchKind::ALL {
            let output = tool(kind, &server, None).invoke("algebra").await;
            assert!(output.contains("Missing SerpAPI key"), "{}: {}", kind.name(), output);
        }
    }

    #[tokio::test]
    async fn test_zero_results_names_the_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"organic_results": []})))
            .mount(&server)
            .await;

        for kind in SearchKind::ALL {
            let output = tool(kind, &server, Some("k")).invoke("quantum tunnelling").await;
            assert!(output.contains("quantum tunnelling"), "{}: {}", kind.name(), output);
            assert!(output.starts_with("No "), "{}: {}", kind.name(), output);
        }
    }

    #[tokio::test]
    async fn test_absent_optional_fields_use_fallbacks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [{}, {"title": "Only a title"}]
            })))
            .mount(&server)
            .await;

        let output = tool(SearchKind::WebSearch, &server, Some("k")).invoke("rust").await;
        assert!(output.starts_with("🔍 Search Results:"));
        assert!(output.contains("1. **No title**\n   No description\n   URL: No link"));
        assert!(output.contains("2. **Only a title**"));

        let output = tool(SearchKind::Flashcards, &server, Some("k")).invoke("rust").await;
        assert!(output.contains("**Card 1**\nQ: What is Concept 1?\nA: No description available"));
    }

    #[tokio::test]
    async fn test_status_failure_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let output = tool(SearchKind::ExamStrategy, &server, Some("k")).invoke("viva").await;
        assert_eq!(output, "Failed to fetch exam strategies. Status code: 503");
    }

    #[tokio::test]
    async fn test_malformed_body_becomes_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let output = tool(SearchKind::ConceptMap, &server, Some("k")).invoke("cells").await;
        assert!(output.starts_with("Error creating concept map: "), "{}", output);
    }

    #[tokio::test]
    async fn test_derived_query_and_result_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "study tips for calculus"))
            .and(query_param("num", "3"))
            .and(query_param("engine", "google"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [
                    {"title": "T1", "snippet": "S1"},
                    {"title": "T2"},
                    {"title": "T3", "snippet": "S3"},
                    {"title": "T4", "snippet": "S4"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = tool(SearchKind::StudyTips, &server, Some("k")).invoke("calculus").await;
        assert_eq!(output, "🎯 Study Tips:\n\n• T1\n  S1\n\n• T2\n• T3\n  S3\n\n");
    }

    #[test]
    fn test_flashcards_split_title_on_delimiter() {
        let results = vec![result("Mitosis - Biology Online", "Cell division.")];
        let output = SearchKind::Flashcards.format("cells", &results);
        assert_eq!(
            output,
            "📇 Flashcards for cells:\n\n**Card 1**\nQ: What is Mitosis?\nA: Cell division.\n\n"
        );
    }

    #[test]
    fn test_concept_map_truncates_snippets() {
        let long = "x".repeat(400);
        let results = vec![result("Enzymes - Wiki", &long)];
        let output = SearchKind::ConceptMap.format("metabolism", &results);

        assert!(output.contains("## Central Concept: METABOLISM"));
        assert!(output.contains(&format!("### Branch 1: Enzymes\n{}...\n\n", "x".repeat(150))));
        assert!(!output.contains(&"x".repeat(151)));
    }

    #[test]
    fn test_note_organizer_layout() {
        let results = vec![result("Cornell Notes - Guide", "Split the page.")];
        let output = SearchKind::NoteOrganizer.format("history", &results);
        assert!(output.starts_with("# 📝 Organized Study Notes for history\n\n## Key Concepts\n"));
        assert!(output.contains("### Cornell Notes\nSplit the page.\n\n## Study Organization Tips\n"));
    }

    #[test]
    fn test_scholarly_authors() {
        let with_authors: OrganicResult = serde_json::from_value(json!({
            "title": "On Growth",
            "snippet": "Abstract text",
            "publication_info": {"authors": [{"name": "D Thompson", "link": "x"}]}
        }))
        .unwrap();
        let without = OrganicResult::default();

        let output = SearchKind::ScholarlyPapers.format("growth", &[with_authors, without]);
        assert!(output.contains("**1. On Growth**\nAuthors: D Thompson\nAbstract: Abstract text"));
        assert!(output.contains("**2. Paper 2**\nAuthors: Unknown authors\nAbstract: No abstract available"));
    }

    #[test]
    fn test_subject_expert_footer() {
        let output = SearchKind::SubjectExpert.format("law", &[result("Torts", "Civil wrongs")]);
        assert!(output.contains("**Expert Point 1**: Torts\nCivil wrongs\n\n"));
        assert!(output.ends_with("- Attending relevant webinars or lectures\n"));
    }

    #[test]
    fn test_headline() {
        assert_eq!(headline("A - B - C"), "A");
        assert_eq!(headline("No delimiter"), "No delimiter");
    }
}
