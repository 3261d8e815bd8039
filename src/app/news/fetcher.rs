use std::time::Duration;

use super::types::{Category, NewsPayload};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("response is not a news payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the `GET /news` endpoint of the sentiment backend.
#[derive(Debug, Clone)]
pub struct NewsClient {
    client: reqwest::Client,
    endpoint: String,
}

impl NewsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/news", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch_news(&self, category: Category) -> Result<NewsPayload, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("category", category.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let payload = serde_json::from_slice::<NewsPayload>(&body)?;
        Ok(payload)
    }
}
