//! Encyclopedia lookup over the MediaWiki Action API.

use super::Tool;
use crate::config::WikipediaSettings;
use crate::error::{Result, StudymateError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const PROVIDER: &str = "Wikipedia";
const TOOL_NAME: &str = "Wikipedia Tool";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default)]
    query: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Default, Deserialize)]
struct Page {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    pageprops: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    title: String,
}

impl Page {
    fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .is_some_and(|props| props.contains_key("disambiguation"))
    }
}

/// A resolved encyclopedia article.
#[derive(Debug, Clone, PartialEq)]
pub struct WikiArticle {
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// Outcome of fetching a page by title.
#[derive(Debug, Clone, PartialEq)]
pub enum WikiLookup {
    Article(WikiArticle),
    /// The title names a disambiguation page; holds candidate titles.
    Disambiguation(Vec<String>),
    Missing,
}

/// Client for the encyclopedia provider.
pub struct WikipediaClient {
    http: reqwest::Client,
    endpoint: String,
    summary_sentences: u32,
    max_suggestions: usize,
}

impl WikipediaClient {
    pub fn new(http: reqwest::Client, settings: &WikipediaSettings) -> Self {
        Self {
            http,
            endpoint: settings.endpoint.clone(),
            summary_sentences: settings.summary_sentences,
            max_suggestions: settings.max_suggestions,
        }
    }

    async fn query<T: DeserializeOwned + Default>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StudymateError::ProviderStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body: ApiResponse<T> = response.json().await?;
        Ok(body.query.unwrap_or_default())
    }

    /// Search titles matching a free-text query, best match first.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<String>> {
        let result: SearchQuery = self
            .query(&[("list", "search"), ("srsearch", query), ("srlimit", "10")])
            .await?;
        debug!("Wikipedia search returned {} titles", result.search.len());
        Ok(result.search.into_iter().map(|hit| hit.title).collect())
    }

    /// Fetch a page summary and canonical URL by exact title.
    #[instrument(skip(self))]
    pub async fn page(&self, title: &str) -> Result<WikiLookup> {
        let sentences = self.summary_sentences.to_string();
        let result: PagesQuery = self
            .query(&[
                ("prop", "extracts|info|pageprops"),
                ("titles", title),
                ("exsentences", sentences.as_str()),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("inprop", "url"),
                ("ppprop", "disambiguation"),
                ("redirects", "1"),
            ])
            .await?;

        let Some(page) = result.pages.into_iter().next() else {
            return Ok(WikiLookup::Missing);
        };

        if page.missing || page.invalid {
            return Ok(WikiLookup::Missing);
        }

        if page.is_disambiguation() {
            let options = self.disambiguation_options(&page.title).await?;
            return Ok(WikiLookup::Disambiguation(options));
        }

        let summary = page
            .extract
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "No summary available.".to_string());
        let url = page.fullurl.unwrap_or_else(|| {
            format!(
                "https://en.wikipedia.org/wiki/{}",
                page.title.replace(' ', "_")
            )
        });

        Ok(WikiLookup::Article(WikiArticle {
            title: page.title,
            summary,
            url,
        }))
    }

    async fn disambiguation_options(&self, title: &str) -> Result<Vec<String>> {
        let limit = self.max_suggestions.to_string();
        let result: PagesQuery = self
            .query(&[
                ("prop", "links"),
                ("titles", title),
                ("plnamespace", "0"),
                ("pllimit", limit.as_str()),
            ])
            .await?;

        Ok(result
            .pages
            .into_iter()
            .flat_map(|page| page.links)
            .map(|link| link.title)
            .take(self.max_suggestions)
            .collect())
    }

    fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }
}

/// Looks up a topic and returns a short encyclopedia summary with its source URL.
pub struct WikipediaTool {
    client: Arc<WikipediaClient>,
}

impl WikipediaTool {
    pub fn new(client: Arc<WikipediaClient>) -> Self {
        Self { client }
    }

    async fn run(&self, query: &str) -> Result<String> {
        let titles = self.client.search(query).await?;
        let Some(top) = titles.first() else {
            return Ok(format!("No Wikipedia results found for '{}'.", query));
        };

        match self.client.page(top).await? {
            WikiLookup::Article(article) => Ok(format!(
                "📚 Wikipedia: {}\n\n{}\n\nSource: {}",
                article.title, article.summary, article.url
            )),
            WikiLookup::Disambiguation(mut options) => {
                if options.is_empty() {
                    options = titles
                        .iter()
                        .skip(1)
                        .take(self.client.max_suggestions())
                        .cloned()
                        .collect();
                }
                if options.is_empty() {
                    return Ok(format!("No Wikipedia page found for '{}'.", query));
                }
                Ok(format!(
                    "Multiple Wikipedia entries found. Try one of these: {}",
                    options.join(", ")
                ))
            }
            WikiLookup::Missing => Ok(format!("No Wikipedia page found for '{}'.", query)),
        }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Fetch Wikipedia summaries on academic topics, concepts, and theories."
    }

    #[instrument(skip(self), fields(tool = TOOL_NAME))]
    async fn invoke(&self, input: &str) -> String {
        info!("Running {}", TOOL_NAME);
        match self.run(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!("{} failed: {}", TOOL_NAME, e);
                format!("Couldn't fetch Wikipedia content: {}", e)
            }
        }
    }
}
