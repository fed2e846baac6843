//! Web search provider client (SerpAPI request/response contract).

use crate::config::SearchSettings;
use crate::error::{Result, StudymateError};
use serde::Deserialize;
use tracing::{debug, instrument};

const PROVIDER: &str = "SerpAPI";

/// Search engine variant requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    GoogleScholar,
}

impl SearchEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::GoogleScholar => "google_scholar",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

/// One organic search hit. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub publication_info: Option<PublicationInfo>,
}

/// Publication details returned by the scholarly engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationInfo {
    #[serde(default)]
    pub authors: Vec<Author>,
}

/// Authors arrive either as plain names or as profile objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Profile {
        #[serde(default)]
        name: String,
    },
}

impl Author {
    pub fn name(&self) -> &str {
        match self {
            Author::Name(name) => name,
            Author::Profile { name } => name,
        }
    }
}

impl OrganicResult {
    /// Non-empty title, if any.
    pub fn title(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    /// Non-empty snippet, if any.
    pub fn snippet(&self) -> Option<&str> {
        non_empty(self.snippet.as_deref())
    }

    /// Non-empty link, if any.
    pub fn link(&self) -> Option<&str> {
        non_empty(self.link.as_deref())
    }

    /// Author names from publication info.
    pub fn authors(&self) -> Vec<&str> {
        self.publication_info
            .as_ref()
            .map(|info| {
                info.authors
                    .iter()
                    .map(Author::name)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Client for the generic web search provider.
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl SearchClient {
    /// Create a client from settings, reading the API key from the environment.
    pub fn from_settings(http: reqwest::Client, settings: &SearchSettings) -> Self {
        Self::new(
            http,
            &settings.endpoint,
            settings.api_key(),
            &settings.api_key_env,
        )
    }

    /// Create a client with an explicit key.
    pub fn new(
        http: reqwest::Client,
        endpoint: &str,
        api_key: Option<String>,
        api_key_env: &str,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            api_key,
            api_key_env: api_key_env.to_string(),
        }
    }

    /// Run a search and return the organic results.
    ///
    /// A missing key fails before any request is made.
    #[instrument(skip(self, engine), fields(engine = engine.as_str()))]
    pub async fn search(
        &self,
        query: &str,
        engine: SearchEngine,
        num: usize,
    ) -> Result<Vec<OrganicResult>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StudymateError::MissingCredential {
                provider: PROVIDER,
                env_var: self.api_key_env.clone(),
            })?;

        let num = num.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("api_key", api_key),
                ("engine", engine.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StudymateError::ProviderStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;
        if let Some(error) = &body.error {
            // The provider reports "no results" through this field too
            debug!("Search provider message: {}", error);
        }

        debug!("Search returned {} results", body.organic_results.len());
        Ok(body.organic_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: Option<&str>) -> SearchClient {
        SearchClient::new(
            reqwest::Client::new(),
            &format!("{}/search", server.uri()),
            key.map(str::to_string),
            "SERPAPI_API_KEY",
        )
    }

    #[tokio::test]
    async fn test_search_sends_contract_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "photosynthesis"))
            .and(query_param("api_key", "secret"))
            .and(query_param("engine", "google_scholar"))
            .and(query_param("num", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [
                    {"title": "Light reactions", "publication_info": {"authors": [{"name": "A Smith"}, "B Jones"]}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client(&server, Some("secret"))
            .search("photosynthesis", SearchEngine::GoogleScholar, 5)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), Some("Light reactions"));
        assert_eq!(results[0].authors(), vec!["A Smith", "B Jones"]);
        assert!(results[0].snippet().is_none());
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, None)
            .search("anything", SearchEngine::Google, 3)
            .await
            .unwrap_err();

        assert!(matches!(err, StudymateError::MissingCredential { .. }));
        assert_eq!(
            err.to_string(),
            "Missing SerpAPI key. Please set the SERPAPI_API_KEY environment variable."
        );
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server, Some("bad"))
            .search("x", SearchEngine::Google, 3)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StudymateError::ProviderStatus { status: 401, .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_results_with_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "Google hasn't returned any results for this query."
            })))
            .mount(&server)
            .await;

        let results = client(&server, Some("k"))
            .search("zzzz", SearchEngine::Google, 3)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
