use crate::{OpportunitySource, SourceError};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use domain::{Category, Deadline, Opportunity, OpportunityType};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Which backend feed this adapter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Jobs,
    Internships,
    Volunteer,
}

impl FeedKind {
    fn path(&self) -> &'static str {
        match self {
            FeedKind::Jobs => "/api/indeed-jobs",
            FeedKind::Internships => "/api/internships",
            FeedKind::Volunteer => "/api/volunteer",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            FeedKind::Jobs => "in",
            FeedKind::Internships => "int",
            FeedKind::Volunteer => "vol",
        }
    }

    fn source_name(&self) -> &'static str {
        match self {
            FeedKind::Jobs => "Indeed",
            FeedKind::Internships => "Internships",
            FeedKind::Volunteer => "Volunteer",
        }
    }

    fn kind(&self) -> OpportunityType {
        match self {
            FeedKind::Jobs => OpportunityType::Job,
            FeedKind::Internships => OpportunityType::Internship,
            FeedKind::Volunteer => OpportunityType::Volunteer,
        }
    }

    fn category(&self) -> Category {
        match self {
            FeedKind::Jobs | FeedKind::Internships => Category::Technology,
            FeedKind::Volunteer => Category::Social,
        }
    }
}

/// Adapter over one of the backend's listing feeds. The backend may not be
/// deployed at all; the never-fails contract makes registering these safe.
#[derive(Debug, Clone)]
pub struct BackendFeed {
    client: Client,
    base_url: String,
    kind: FeedKind,
}

impl BackendFeed {
    pub fn new(base_url: impl Into<String>, kind: FeedKind) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            kind,
        })
    }

    async fn fetch_inner(&self, location: Option<&str>) -> Result<Vec<Opportunity>, SourceError> {
        let url = format!("{}{}", self.base_url, self.kind.path());
        let mut request = self.client.get(&url);
        if let Some(location) = location {
            request = request.query(&[("location", location)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let feed: FeedResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        Ok(feed
            .items
            .into_iter()
            .map(|item| self.map_item(item))
            .collect())
    }

    fn map_item(&self, item: FeedItem) -> Opportunity {
        Opportunity {
            id: format!("{}-{}", self.kind.id_prefix(), item.id),
            title: item.title,
            organization: item.organization,
            kind: self.kind.kind(),
            deadline: item.deadline,
            eligibility: item
                .eligibility
                .unwrap_or_else(|| "See listing for details".to_string()),
            link: item.url,
            description: item.description,
            category: self.kind.category(),
            source: self.kind.source_name().to_string(),
            location: item.location,
            tags: item.tags,
            logo: item.logo,
            trending: false,
        }
    }
}

#[async_trait]
impl OpportunitySource for BackendFeed {
    fn name(&self) -> &str {
        self.kind.source_name()
    }

    async fn fetch(&self, query: Option<&str>) -> Vec<Opportunity> {
        match self.fetch_inner(query).await {
            Ok(opportunities) => {
                debug!(
                    "{} feed returned {} listings",
                    self.kind.source_name(),
                    opportunities.len()
                );
                opportunities
            }
            Err(e) => {
                warn!(
                    "{} feed failed, contributing nothing: {e}",
                    self.kind.source_name()
                );
                Vec::new()
            }
        }
    }
}

// Shared wire schema for all three feeds. Job feeds say `company`/`skills`,
// the volunteer feed says `organization`/`categories`; aliases cover both.
#[derive(Debug, Deserialize)]
struct FeedResponse {
    items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    id: String,
    title: String,
    #[serde(alias = "company")]
    organization: String,
    #[serde(default)]
    location: Option<String>,
    deadline: Deadline,
    description: String,
    url: String,
    #[serde(default)]
    eligibility: Option<String>,
    #[serde(default, alias = "skills", alias = "categories")]
    tags: Vec<String>,
    #[serde(default, alias = "company_logo", alias = "organization_logo")]
    logo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const JOBS_BODY: &str = r#"{
        "items": [
            {
                "id": "9001",
                "title": "Backend Engineer",
                "company": "Acme",
                "location": "Berlin",
                "deadline": "2025-06-01",
                "description": "Build services",
                "url": "https://jobs.example/9001",
                "skills": ["Rust", "Postgres"],
                "company_logo": "https://logo.example/acme"
            }
        ]
    }"#;

    #[tokio::test]
    async fn jobs_feed_maps_with_in_prefix() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/indeed-jobs")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(JOBS_BODY)
            .create_async()
            .await;

        let feed = BackendFeed::new(server.url(), FeedKind::Jobs).expect("client builds");
        let opportunities = feed.fetch(Some("Berlin")).await;
        assert_eq!(opportunities.len(), 1);

        let opp = &opportunities[0];
        assert_eq!(opp.id, "in-9001");
        assert_eq!(opp.organization, "Acme");
        assert_eq!(opp.kind, OpportunityType::Job);
        assert_eq!(opp.tags, vec!["Rust", "Postgres"]);
        assert_eq!(opp.eligibility, "See listing for details");
    }

    #[tokio::test]
    async fn volunteer_feed_accepts_organization_alias() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/volunteer")
            .with_status(200)
            .with_body(
                r#"{"items": [{
                    "id": "v7",
                    "title": "Food Bank Helper",
                    "organization": "FoodShare",
                    "deadline": "Rolling Applications",
                    "description": "Distribute food",
                    "url": "https://volunteer.example/v7",
                    "categories": ["Community"],
                    "organization_logo": "https://logo.example/foodshare"
                }]}"#,
            )
            .create_async()
            .await;

        let feed = BackendFeed::new(server.url(), FeedKind::Volunteer).expect("client builds");
        let opportunities = feed.fetch(None).await;
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].id, "vol-v7");
        assert_eq!(opportunities[0].deadline, Deadline::RollingApplications);
        assert_eq!(opportunities[0].tags, vec!["Community"]);
    }

    #[tokio::test]
    async fn unreachable_backend_contributes_empty_list() {
        // Nothing is listening on this port.
        let feed =
            BackendFeed::new("http://127.0.0.1:1", FeedKind::Internships).expect("client builds");
        assert!(feed.fetch(None).await.is_empty());
    }
}
