//! Fan-out/fan-in across all registered source adapters, plus the filtering
//! and trending selection applied to the merged list.
//!
//! Failure policy: a dead adapter contributes an empty list (handled inside
//! the adapter, never here). Only the fan-out join itself can fail, and that
//! surfaces as a hard "failed to load" error to the caller.

use domain::{Category, Opportunity};
use sources::OpportunitySource;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on the trending list.
const TRENDING_LIMIT: usize = 20;

/// Tag that marks a code-hosting record as trending even without the flag.
const TRENDING_TAG: &str = "trending";

#[derive(Debug, Error)]
#[error("failed to load opportunities: {0}")]
pub struct AggregateError(String);

/// Merges every registered source into one list. Adapter registration order
/// is concatenation order; there is no global sort.
pub struct Aggregator {
    sources: Vec<Arc<dyn OpportunitySource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn OpportunitySource>>) -> Self {
        Self { sources }
    }

    /// Runs every adapter concurrently, concatenates in adapter order, then
    /// applies the optional location filter.
    pub async fn fetch_all(
        &self,
        query: &str,
        location: &str,
    ) -> Result<Vec<Opportunity>, AggregateError> {
        let query = (!query.is_empty()).then(|| query.to_string());

        let handles: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let query = query.clone();
                tokio::spawn(async move { source.fetch(query.as_deref()).await })
            })
            .collect();

        let mut merged = Vec::new();
        for handle in handles {
            // A panicked or aborted adapter task fails the whole aggregate;
            // this is the documented asymmetry vs per-adapter isolation.
            let items = handle.await.map_err(|e| {
                warn!("adapter task failed to join: {e}");
                AggregateError(e.to_string())
            })?;
            merged.extend(items);
        }

        debug!("aggregated {} opportunities", merged.len());

        if location.is_empty() {
            return Ok(merged);
        }
        Ok(merged
            .into_iter()
            .filter(|opp| passes_location(opp.location.as_deref(), location))
            .collect())
    }

    /// Opportunities flagged as trending, or GitHub records carrying the
    /// literal "trending" tag. First `TRENDING_LIMIT` in pre-filter order;
    /// the boolean flag is the only signal, there is no popularity score.
    pub async fn trending(&self) -> Result<Vec<Opportunity>, AggregateError> {
        let all = self.fetch_all("", "").await?;
        Ok(all
            .into_iter()
            .filter(|opp| {
                opp.trending
                    || (opp.source == "GitHub" && opp.tags.iter().any(|t| t == TRENDING_TAG))
            })
            .take(TRENDING_LIMIT)
            .collect())
    }

    /// Full-text search: the query is forwarded to the adapters, then the
    /// merged list is filtered again by case-insensitive substring match on
    /// title, description, organization, or any tag.
    pub async fn search(&self, query: &str) -> Result<Vec<Opportunity>, AggregateError> {
        let all = self.fetch_all(query, "").await?;
        Ok(all.into_iter().filter(|opp| opp.matches(query)).collect())
    }

    /// Exact category match over the full merged list.
    pub async fn by_category(&self, category: Category) -> Result<Vec<Opportunity>, AggregateError> {
        let all = self.fetch_all("", "").await?;
        Ok(all
            .into_iter()
            .filter(|opp| opp.category == category)
            .collect())
    }
}

/// Permissive location filter: listings without a location, and listings
/// whose location is exactly "Remote", always pass.
fn passes_location(location: Option<&str>, wanted: &str) -> bool {
    match location {
        None => true,
        Some(loc) => {
            let loc = loc.to_lowercase();
            loc.contains(&wanted.to_lowercase()) || loc == "remote"
        }
    }
}
