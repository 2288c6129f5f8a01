use crate::store::{MessageStore, StoreError};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use domain::{ChatMessage, NewMessage};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Message collection hosted by the backend: documents keyed by an
/// auto-assigned id, range-queried by owner and ordered by the
/// server-assigned timestamp.
#[derive(Debug, Clone)]
pub struct RestMessageStore {
    client: Client,
    base_url: String,
}

impl RestMessageStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/api/messages", self.base_url)
    }
}

#[async_trait]
impl MessageStore for RestMessageStore {
    async fn append(&self, message: NewMessage) -> Result<ChatMessage, StoreError> {
        let response = self
            .client
            .post(self.collection_url())
            .json(&message)
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::from_status(status.as_u16()));
        }

        let stored: ChatMessage = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        debug!("appended message {} for {}", stored.id, stored.user_id);
        Ok(stored)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let response = self
            .client
            .get(self.collection_url())
            .query(&[("userId", user_id), ("orderBy", "timestamp")])
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::from_status(status.as_u16()));
        }

        // Rendered in the order the store returns; no client-side re-sort.
        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.collection_url(), id))
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::from_status(status.as_u16()));
        }
        Ok(())
    }
}
