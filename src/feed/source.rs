use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::article::ArticleRecord;
use crate::error::FeedError;
use crate::gateway::WikipediaGateway;
use crate::{MAX_BATCH, MIN_BATCH};

/// Something the feed can ask for a batch of random articles.
pub trait ArticleSource: Send + Sync + 'static {
    fn fetch_batch(
        &self,
        count: usize,
    ) -> impl Future<Output = Result<Vec<ArticleRecord>, FeedError>> + Send;
}

impl ArticleSource for WikipediaGateway {
    async fn fetch_batch(&self, count: usize) -> Result<Vec<ArticleRecord>, FeedError> {
        Ok(self.get_random_articles(count).await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct ClearCacheResponse {
    pub success: bool,
    pub message: String,
}

/// HTTP client for the gateway's own endpoints.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
}

impl GatewayClient {
    /// `base_url` is the mount point of the article routes,
    /// e.g. `http://127.0.0.1:5000/api/wikipedia`.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FeedError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_random_article(&self) -> Result<ArticleRecord, FeedError> {
        let response = self
            .http
            .get(format!("{}/random", self.base_url))
            .send()
            .await?;
        decode(response, "Failed to fetch random article").await
    }

    /// `count` is clamped into the range the gateway accepts.
    pub async fn fetch_random_articles(
        &self,
        count: usize,
    ) -> Result<Vec<ArticleRecord>, FeedError> {
        let count = count.clamp(MIN_BATCH, MAX_BATCH);
        let response = self
            .http
            .get(format!("{}/random-batch", self.base_url))
            .query(&[("count", count)])
            .send()
            .await?;
        decode(response, "Failed to fetch random articles").await
    }

    pub async fn clear_cache(&self) -> Result<ClearCacheResponse, FeedError> {
        let response = self
            .http
            .post(format!("{}/clear-cache", self.base_url))
            .send()
            .await?;
        decode(response, "Failed to clear cache").await
    }
}

impl ArticleSource for GatewayClient {
    async fn fetch_batch(&self, count: usize) -> Result<Vec<ArticleRecord>, FeedError> {
        self.fetch_random_articles(count).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, FeedError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    // Error bodies carry `{error, message}`; anything else gets the fallback.
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| fallback.to_string());

    Err(FeedError::Service { status, message })
}
