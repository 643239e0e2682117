use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::article::ArticleRecord;
use crate::cache::ArticleCache;
use crate::error::GatewayError;
use crate::wikipedia::WikipediaClient;

/// Serves batches of random articles out of a single time-boxed cache,
/// refilling it from the upstream API on a miss.
///
/// The cache lock is held for the whole check, fetch and write sequence, so
/// overlapping misses collapse into one upstream refresh and later callers
/// read what the first one stored.
pub struct WikipediaGateway {
    client: WikipediaClient,
    cache: Mutex<ArticleCache>,
    cache_lifetime: Duration,
}

impl WikipediaGateway {
    pub fn new(client: WikipediaClient, cache_lifetime: Duration) -> Self {
        Self {
            client,
            cache: Mutex::new(ArticleCache::empty()),
            cache_lifetime,
        }
    }

    pub fn cache_lifetime(&self) -> Duration {
        self.cache_lifetime
    }

    /// Up to `count` random articles. `count` is validated by callers.
    ///
    /// A fresh cache with enough records answers without touching the
    /// upstream. When a refresh fails, any previous batch is returned even if
    /// expired; only an empty cache lets the error through.
    pub async fn get_random_articles(
        &self,
        count: usize,
    ) -> Result<Vec<ArticleRecord>, GatewayError> {
        self.get_random_articles_at(count, Utc::now()).await
    }

    /// Same as [`get_random_articles`](Self::get_random_articles) with the
    /// cache judged and stamped at `now`.
    pub async fn get_random_articles_at(
        &self,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArticleRecord>, GatewayError> {
        let mut cache = self.cache.lock().await;

        if cache.serves(count, now, self.cache_lifetime) {
            info!(count, "using cached articles");
            return Ok(cache.first(count));
        }

        info!(count, "fetching random articles from upstream");
        match self.fetch_from_upstream(count).await {
            Ok(articles) => {
                cache.replace(articles.clone(), now);
                Ok(articles)
            }
            Err(e) if !cache.is_empty() => {
                warn!(
                    error = %e,
                    cached = cache.articles.len(),
                    "upstream failed, serving stale cache"
                );
                Ok(cache.first(count))
            }
            Err(e) => {
                warn!(error = %e, "upstream failed with nothing cached");
                Err(e)
            }
        }
    }

    pub async fn get_random_article(&self) -> Result<ArticleRecord, GatewayError> {
        self.get_random_articles(1)
            .await?
            .into_iter()
            .next()
            .ok_or(GatewayError::Empty)
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        info!("article cache cleared");
    }

    /// Copy of the current cache contents.
    pub async fn snapshot(&self) -> ArticleCache {
        self.cache.lock().await.clone()
    }

    async fn fetch_from_upstream(
        &self,
        count: usize,
    ) -> Result<Vec<ArticleRecord>, GatewayError> {
        let titles = self.client.fetch_random_titles(count).await?;
        self.client.fetch_article_details(&titles).await
    }
}
