use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::article::{ArticleRecord, DetailResponse, RandomResponse};
use crate::error::GatewayError;

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_WIKI_URL: &str = "https://en.wikipedia.org/wiki/";

fn build_user_agent() -> HeaderMap {
    let agent = concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION"),
        " (random article feed)"
    );

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(agent));
    headers
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_url: Url,
    pub wiki_url: Url,
    pub extract_chars: u32,
    pub thumb_size: u32,
    pub request_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default api url"),
            wiki_url: Url::parse(DEFAULT_WIKI_URL).expect("default wiki url"),
            extract_chars: 300,
            thumb_size: 500,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Thin client over the MediaWiki action API.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    http: Client,
    config: UpstreamConfig,
}

impl WikipediaClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .default_headers(build_user_agent())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { http, config })
    }

    /// Titles of `count` random main-namespace articles.
    pub async fn fetch_random_titles(&self, count: usize) -> Result<Vec<String>, GatewayError> {
        let limit = count.to_string();
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("list", "random"),
            ("rnnamespace", "0"),
            ("rnlimit", limit.as_str()),
            ("origin", "*"),
        ];

        let response: RandomResponse = self.get_json(&params).await?;
        Ok(response
            .query
            .random
            .into_iter()
            .map(|entry| entry.title)
            .collect())
    }

    /// Details for `titles` in one batched call. Whatever pages come back are
    /// returned; shortfalls are not refilled.
    pub async fn fetch_article_details(
        &self,
        titles: &[String],
    ) -> Result<Vec<ArticleRecord>, GatewayError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let joined = titles.join("|");
        let exchars = self.config.extract_chars.to_string();
        let thumb_size = self.config.thumb_size.to_string();
        let pilimit = titles.len().to_string();
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("prop", "extracts|pageimages|info"),
            ("exintro", "true"),
            ("exchars", exchars.as_str()),
            ("explaintext", "true"),
            ("piprop", "thumbnail|original"),
            ("pithumbsize", thumb_size.as_str()),
            ("pilimit", pilimit.as_str()),
            ("inprop", "url"),
            ("titles", joined.as_str()),
            ("origin", "*"),
        ];

        let response: DetailResponse = self.get_json(&params).await?;
        let records = response.into_records(&self.config.wiki_url, Utc::now());
        debug!(requested = titles.len(), received = records.len(), "article details fetched");

        Ok(records)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .get(self.config.api_url.clone())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status,
                url: response.url().to_string(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| GatewayError::Malformed(e.to_string()))
    }
}
