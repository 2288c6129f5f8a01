//! Provider adapters: fetch from an external source and normalize into the
//! shared `Opportunity` shape.
//!
//! The contract every adapter upholds: `fetch` never fails. A dead source
//! logs the problem and contributes an empty list, so one broken provider
//! cannot take down the aggregate.

use anyhow::Result;
use async_trait::async_trait;
use domain::Opportunity;
use std::sync::Arc;
use thiserror::Error;

pub mod curated;
pub mod feeds;
pub mod github;
pub mod seed;

pub use curated::CuratedSource;
pub use feeds::{BackendFeed, FeedKind};
pub use github::GithubSource;
pub use seed::OpportunitySeeder;

/// A provider-specific fetch-and-normalize adapter.
#[async_trait]
pub trait OpportunitySource: Send + Sync {
    /// Provider name as recorded in `Opportunity::source`.
    fn name(&self) -> &str;

    /// Fetches and normalizes listings. Never fails: any network or decode
    /// problem is logged and yields an empty list.
    async fn fetch(&self, query: Option<&str>) -> Vec<Opportunity>;
}

/// The full adapter registry in concatenation order: live code-hosting
/// search first, then the curated catalog, then the backend feeds.
pub fn default_sources(backend_base_url: &str) -> Result<Vec<Arc<dyn OpportunitySource>>> {
    Ok(vec![
        Arc::new(GithubSource::new()?),
        Arc::new(CuratedSource::new()),
        Arc::new(BackendFeed::new(backend_base_url, FeedKind::Jobs)?),
        Arc::new(BackendFeed::new(backend_base_url, FeedKind::Internships)?),
        Arc::new(BackendFeed::new(backend_base_url, FeedKind::Volunteer)?),
    ])
}

/// What went wrong inside an adapter, before the never-fails contract
/// swallows it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected payload: {0}")]
    Decode(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),
}
