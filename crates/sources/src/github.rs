use crate::{OpportunitySource, SourceError};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use domain::{Category, Deadline, Opportunity, OpportunityType};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "oppgenie/0.1";
const PER_PAGE: u32 = 20;

/// Star count above which a repository counts as trending.
const TRENDING_STARS: u64 = 1000;

/// Adapter over the public code-hosting search API. Repositories looking
/// for contributors are surfaced as open-source opportunities.
#[derive(Debug, Clone)]
pub struct GithubSource {
    client: Client,
    api_url: String,
}

impl GithubSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Points the adapter at a different API host. Used by tests.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn build_query(search: Option<&str>) -> String {
        match search {
            Some(term) if !term.is_empty() => {
                format!("{term} in:name,description,readme good-first-issues:>0")
            }
            _ => "good-first-issues:>0 help-wanted-issues:>0 stars:>100".to_string(),
        }
    }

    async fn fetch_inner(&self, query: Option<&str>) -> Result<Vec<Opportunity>, SourceError> {
        let url = format!("{}/search/repositories", self.api_url);
        let params = [
            ("q", Self::build_query(query)),
            ("sort", "updated".to_string()),
            ("order", "desc".to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        let response = self
            .client
            .get(&url)
            .query(&params)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let search: GithubSearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        Ok(search.items.into_iter().map(map_repo).collect())
    }
}

#[async_trait]
impl OpportunitySource for GithubSource {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn fetch(&self, query: Option<&str>) -> Vec<Opportunity> {
        match self.fetch_inner(query).await {
            Ok(opportunities) => {
                debug!("GitHub returned {} repositories", opportunities.len());
                opportunities
            }
            Err(e) => {
                warn!("GitHub fetch failed, contributing nothing: {e}");
                Vec::new()
            }
        }
    }
}

fn map_repo(repo: GithubRepo) -> Opportunity {
    let mut tags: Vec<String> = Vec::with_capacity(repo.topics.len() + 1);
    if let Some(language) = repo.language {
        tags.push(language);
    }
    tags.extend(repo.topics);

    Opportunity {
        id: format!("gh-{}", repo.id),
        title: format!("Contribute to {}", repo.name),
        organization: repo.owner.login,
        kind: OpportunityType::OpenSource,
        deadline: Deadline::Ongoing,
        eligibility: "Open to all contributors".to_string(),
        link: repo.html_url,
        description: repo
            .description
            .unwrap_or_else(|| "No description available".to_string()),
        category: Category::Technology,
        source: "GitHub".to_string(),
        location: Some("Remote".to_string()),
        tags,
        logo: Some(repo.owner.avatar_url),
        trending: repo.stargazers_count > TRENDING_STARS,
    }
}

// Wire schema for the repository search endpoint. Unknown shapes fail the
// decode, which the never-fails contract turns into an empty contribution.
#[derive(Debug, Deserialize)]
struct GithubSearchResponse {
    items: Vec<GithubRepo>,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    id: u64,
    name: String,
    owner: GithubOwner,
    description: Option<String>,
    html_url: String,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    stargazers_count: u64,
}

#[derive(Debug, Deserialize)]
struct GithubOwner {
    login: String,
    avatar_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const SEARCH_BODY: &str = r#"{
        "items": [
            {
                "id": 101,
                "name": "rustls",
                "owner": {"login": "rustls", "avatar_url": "https://avatars.example/rustls"},
                "description": "A modern TLS library",
                "html_url": "https://github.com/rustls/rustls",
                "language": "Rust",
                "topics": ["tls", "crypto"],
                "stargazers_count": 5200
            },
            {
                "id": 102,
                "name": "tinyproxy",
                "owner": {"login": "alice", "avatar_url": "https://avatars.example/alice"},
                "description": null,
                "html_url": "https://github.com/alice/tinyproxy",
                "language": null,
                "topics": [],
                "stargazers_count": 150
            }
        ]
    }"#;

    fn source(server: &Server) -> GithubSource {
        GithubSource::new()
            .expect("client builds")
            .with_api_url(server.url())
    }

    #[tokio::test]
    async fn maps_repositories_into_opportunities() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/search/repositories")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SEARCH_BODY)
            .create_async()
            .await;

        let opportunities = source(&server).fetch(None).await;
        assert_eq!(opportunities.len(), 2);

        let first = &opportunities[0];
        assert_eq!(first.id, "gh-101");
        assert_eq!(first.title, "Contribute to rustls");
        assert_eq!(first.organization, "rustls");
        assert_eq!(first.kind, OpportunityType::OpenSource);
        assert_eq!(first.deadline, Deadline::Ongoing);
        assert_eq!(first.tags, vec!["Rust", "tls", "crypto"]);
        assert!(first.trending, "5200 stars crosses the threshold");

        let second = &opportunities[1];
        assert_eq!(second.description, "No description available");
        assert!(second.tags.is_empty());
        assert!(!second.trending, "150 stars does not cross the threshold");
    }

    #[tokio::test]
    async fn server_error_contributes_empty_list() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/search/repositories")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        assert!(source(&server).fetch(None).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_contributes_empty_list() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/search/repositories")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        assert!(source(&server).fetch(Some("rust")).await.is_empty());
    }

    #[test]
    fn query_includes_search_term_when_present() {
        assert_eq!(
            GithubSource::build_query(Some("compilers")),
            "compilers in:name,description,readme good-first-issues:>0"
        );
        assert_eq!(
            GithubSource::build_query(None),
            "good-first-issues:>0 help-wanted-issues:>0 stars:>100"
        );
    }
}
