use crate::models::Incident;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed returned status {0}")]
    Status(u16),
}

/// Read side of the status page. One fetch per tick (or per bootstrap).
#[async_trait::async_trait]
pub trait FeedSource {
    async fn fetch_incidents(&self) -> Result<Vec<Incident>, FeedError>;
}

/// Fetches the current incident list from a status-page API.
#[derive(Debug, Clone)]
pub struct StatusPageFeed {
    client: Client,
    base_url: String,
}

impl StatusPageFeed {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl FeedSource for StatusPageFeed {
    async fn fetch_incidents(&self) -> Result<Vec<Incident>, FeedError> {
        let url = format!("{}/incidents.json", self.base_url.trim_end_matches('/'));
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let body = response.json::<IncidentsResponse>().await?;
        Ok(body.incidents)
    }
}

#[derive(Debug, Deserialize)]
struct IncidentsResponse {
    incidents: Vec<Incident>,
}
