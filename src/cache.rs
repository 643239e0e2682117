use chrono::{DateTime, Duration, Utc};

use crate::article::ArticleRecord;

/// Single-slot batch cache. Every successful refresh replaces it wholesale.
#[derive(Debug, Clone)]
pub struct ArticleCache {
    pub articles: Vec<ArticleRecord>,
    pub last_fetched: DateTime<Utc>, // UTC time of the last successful refresh
}

impl ArticleCache {
    pub fn empty() -> Self {
        Self {
            articles: Vec::new(),
            last_fetched: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Fresh means non-empty and younger than `lifetime` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, lifetime: Duration) -> bool {
        !self.is_empty() && now - self.last_fetched < lifetime
    }

    /// Fresh and holding at least `count` records.
    pub fn serves(&self, count: usize, now: DateTime<Utc>, lifetime: Duration) -> bool {
        self.is_fresh(now, lifetime) && self.articles.len() >= count
    }

    pub fn first(&self, count: usize) -> Vec<ArticleRecord> {
        self.articles.iter().take(count).cloned().collect()
    }

    pub fn replace(&mut self, articles: Vec<ArticleRecord>, fetched_at: DateTime<Utc>) {
        *self = Self {
            articles,
            last_fetched: fetched_at,
        };
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> ArticleRecord {
        ArticleRecord {
            id,
            title: format!("Article {id}"),
            excerpt: String::new(),
            thumbnail_url: None,
            full_image_url: None,
            url: format!("https://en.wikipedia.org/wiki/Article_{id}"),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn starts_empty_at_epoch() {
        let cache = ArticleCache::empty();
        assert!(cache.is_empty());
        assert_eq!(cache.last_fetched, DateTime::<Utc>::UNIX_EPOCH);
        assert!(!cache.is_fresh(Utc::now(), Duration::minutes(30)));
    }

    #[test]
    fn freshness_follows_lifetime() {
        let fetched = Utc::now();
        let mut cache = ArticleCache::empty();
        cache.replace(vec![record(1), record(2)], fetched);

        let lifetime = Duration::minutes(30);
        assert!(cache.serves(2, fetched + Duration::minutes(29), lifetime));
        assert!(!cache.serves(3, fetched + Duration::minutes(29), lifetime));
        assert!(!cache.is_fresh(fetched + Duration::minutes(30), lifetime));
        assert!(!cache.is_fresh(fetched + Duration::minutes(31), lifetime));
    }

    #[test]
    fn clear_resets_to_epoch() {
        let mut cache = ArticleCache::empty();
        cache.replace(vec![record(1)], Utc::now());
        cache.clear();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.last_fetched, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn first_takes_a_prefix() {
        let mut cache = ArticleCache::empty();
        cache.replace(vec![record(1), record(2), record(3)], Utc::now());
        let ids: Vec<u64> = cache.first(2).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(cache.first(10).len(), 3);
    }
}
