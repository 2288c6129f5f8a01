use anyhow::{anyhow, Result};
use domain::Opportunity;
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// Write-only bulk insert of curated records into the backend's opportunity
/// collection. The aggregator never reads this collection back; it exists
/// for the backend's own consumers.
#[derive(Debug, Clone)]
pub struct OpportunitySeeder {
    client: Client,
    base_url: String,
}

impl OpportunitySeeder {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Inserts all records concurrently. One aggregate outcome: the number
    /// inserted on success, or an error naming how many made it.
    pub async fn seed(&self, records: &[Opportunity]) -> Result<usize> {
        let url = format!("{}/api/opportunities", self.base_url);

        let inserts = records.iter().map(|record| {
            let client = self.client.clone();
            let url = url.clone();
            async move {
                let response = client.post(&url).json(record).send().await?;
                response.error_for_status()?;
                Ok::<_, reqwest::Error>(())
            }
        });

        let results = join_all(inserts).await;
        let inserted = results.iter().filter(|r| r.is_ok()).count();

        if inserted == records.len() {
            info!("Seeded {inserted} opportunities");
            Ok(inserted)
        } else {
            warn!("Seeded only {inserted} of {} opportunities", records.len());
            Err(anyhow!(
                "seeding incomplete: {inserted} of {} records inserted",
                records.len()
            ))
        }
    }
}
