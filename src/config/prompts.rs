//! Prompt templates for Studymate.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the study agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
    /// Wraps every user query before it reaches the model.
    pub query: String,
    /// Sent when the iteration limit is hit and a final answer is still needed.
    pub final_answer: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a friendly study and research companion for students.

You have tools to look up encyclopedia summaries, search the web, summarize educational YouTube videos,
find scholarly papers, and generate study material such as tips, exam strategies, flashcards,
organized notes, concept maps and expert insights.

Guidelines:
- Decide which tools (if any) are relevant to the question; you may use several
- Every tool takes a single free-text "input" (a topic, a question, or a YouTube URL/ID)
- Combine what the tools return into one clear, well-structured answer
- Keep source links that the tools provide
- If a tool reports an error, carry on with the information you have
- Remember context from earlier in the conversation"#
                .to_string(),

            query: "Based on all available information, please provide a detailed and helpful answer to this query: {{query}}"
                .to_string(),

            final_answer: r#"You have used all available tool steps. Using only the information gathered so far,
write your final answer to the user's query now. Do not request any more tools."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables and are
    /// substituted last, so their values are never re-rendered.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let custom: HashMap<String, String> = self
            .variables
            .iter()
            .filter(|(key, _)| !vars.contains_key(*key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self::render(&Self::render(template, &custom), vars)
    }

    /// Wrap a user query in the agent query template.
    pub fn render_query(&self, query: &str) -> String {
        let vars = HashMap::from([("query".to_string(), query.to_string())]);
        self.render_with_custom(&self.agent.query, &vars)
    }

    /// Render the agent system prompt with custom variables applied.
    pub fn render_system(&self) -> String {
        self.render_with_custom(&self.agent.system, &HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.agent.system.is_empty());
        assert!(prompts.agent.query.contains("{{query}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_query_uses_fixed_template() {
        let prompts = Prompts::default();
        assert_eq!(
            prompts.render_query("photosynthesis"),
            "Based on all available information, please provide a detailed and helpful answer to this query: photosynthesis"
        );
    }

    #[test]
    fn test_query_variable_wins_over_custom_variable() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("query".to_string(), "ignored".to_string());
        assert!(prompts.render_query("cells").ends_with("query: cells"));
    }

    #[test]
    fn test_query_text_is_not_rendered() {
        let mut prompts = Prompts::default();
        prompts.agent.query = "For a {{level}} student: {{query}}".to_string();
        prompts
            .variables
            .insert("level".to_string(), "first-year".to_string());

        assert_eq!(
            prompts.render_query("what does {{level}} mean in jinja?"),
            "For a first-year student: what does {{level}} mean in jinja?"
        );
    }

    #[test]
    fn test_load_custom_agent_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("agent.toml"),
            "system = \"Tutor for {{level}} students\"\n",
        )
        .unwrap();

        let vars = HashMap::from([("level".to_string(), "first-year".to_string())]);
        let prompts = Prompts::load(dir.path().to_str(), Some(&vars)).unwrap();

        assert_eq!(prompts.render_system(), "Tutor for first-year students");
        // Unset fields fall back to defaults
        assert!(prompts.agent.query.contains("{{query}}"));
    }
}
