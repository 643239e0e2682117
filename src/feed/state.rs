use std::collections::HashSet;

use crate::article::ArticleRecord;

/// Pagination starts once the active card is this close to the end.
pub const LOAD_MORE_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Initial,
    Loaded,
    LoadingMore,
    ErroredInitial,
    ErroredMore,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Initial,
    More,
}

/// Describes one fetch the feed wants performed. Results must be handed back
/// through [`FeedState::complete`] with the same ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub kind: FetchKind,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied { appended: usize },
    Failed,
    /// The ticket belongs to an older session or arrived after unmount.
    Stale,
}

#[derive(Debug, Clone)]
pub struct FeedState {
    articles: Vec<ArticleRecord>,
    active_index: usize,
    has_more: bool,
    is_loading: bool,
    is_loading_more: bool,
    error: Option<String>,
    generation: u64,
    batch_size: usize,
    mounted: bool,
}

impl FeedState {
    pub fn new(batch_size: usize) -> Self {
        Self {
            articles: Vec::new(),
            active_index: 0,
            has_more: true,
            is_loading: true,
            is_loading_more: false,
            error: None,
            generation: 0,
            batch_size,
            mounted: false,
        }
    }

    pub fn articles(&self) -> &[ArticleRecord] {
        &self.articles
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_article(&self) -> Option<&ArticleRecord> {
        self.articles.get(self.active_index)
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.is_loading_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn phase(&self) -> FeedPhase {
        if self.is_loading {
            FeedPhase::Initial
        } else if self.articles.is_empty() && self.error.is_some() {
            FeedPhase::ErroredInitial
        } else if self.is_loading_more {
            FeedPhase::LoadingMore
        } else if self.error.is_some() {
            FeedPhase::ErroredMore
        } else if !self.has_more {
            FeedPhase::Exhausted
        } else {
            FeedPhase::Loaded
        }
    }

    pub fn mount(&mut self) -> FetchTicket {
        self.mounted = true;
        self.begin_initial()
    }

    /// Stops accepting results. Anything still in flight is dropped on arrival.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.generation += 1;
    }

    /// Full reset into `Initial`; results of earlier tickets become stale.
    pub fn begin_initial(&mut self) -> FetchTicket {
        self.generation += 1;
        self.articles.clear();
        self.active_index = 0;
        self.has_more = true;
        self.is_loading = true;
        self.is_loading_more = false;
        self.error = None;
        self.ticket(FetchKind::Initial)
    }

    /// Starts pagination unless something is loading, the feed is exhausted
    /// or a previous error is still waiting for an explicit retry.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if !self.mounted
            || self.is_loading
            || self.is_loading_more
            || !self.has_more
            || self.articles.is_empty()
            || self.error.is_some()
        {
            return None;
        }

        self.is_loading_more = true;
        Some(self.ticket(FetchKind::More))
    }

    /// True once the active card is within [`LOAD_MORE_THRESHOLD`] of the end.
    pub fn near_end(&self) -> bool {
        !self.articles.is_empty() && self.articles.len() - self.active_index <= LOAD_MORE_THRESHOLD
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<ArticleRecord>, String>,
    ) -> Completion {
        if !self.mounted || ticket.generation != self.generation {
            return Completion::Stale;
        }

        match ticket.kind {
            FetchKind::Initial => {
                if !self.is_loading {
                    return Completion::Stale;
                }
                self.is_loading = false;

                match result {
                    Ok(batch) => {
                        self.has_more = !batch.is_empty();
                        let appended = self.append(batch);
                        self.active_index = 0;
                        Completion::Applied { appended }
                    }
                    Err(message) => {
                        self.error = Some(message);
                        Completion::Failed
                    }
                }
            }
            FetchKind::More => {
                if !self.is_loading_more {
                    return Completion::Stale;
                }
                self.is_loading_more = false;

                match result {
                    Ok(batch) => {
                        // duplicates are filtered, only an empty page ends the feed
                        if batch.is_empty() {
                            self.has_more = false;
                        }
                        let appended = self.append(batch);
                        Completion::Applied { appended }
                    }
                    Err(message) => {
                        self.error = Some(message);
                        Completion::Failed
                    }
                }
            }
        }
    }

    /// Retries whatever failed: the first load when nothing is shown,
    /// otherwise the pagination step.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        if !self.mounted {
            return None;
        }

        if self.articles.is_empty() {
            if self.is_loading {
                return None;
            }
            return Some(self.begin_initial());
        }

        if self.is_loading_more {
            return None;
        }
        self.error = None;
        self.begin_load_more()
    }

    pub fn refresh(&mut self) -> Option<FetchTicket> {
        if !self.mounted {
            return None;
        }
        Some(self.begin_initial())
    }

    /// Moves the active index by `delta`, clamped to the list. Returns whether it moved.
    pub fn move_active(&mut self, delta: isize) -> bool {
        if self.articles.is_empty() {
            return false;
        }
        let target = self
            .active_index
            .saturating_add_signed(delta)
            .min(self.articles.len() - 1);
        self.set_active(target)
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.articles.len() || index == self.active_index {
            return false;
        }
        self.active_index = index;
        true
    }

    // The id set is rebuilt from the whole list on every batch.
    fn append(&mut self, batch: Vec<ArticleRecord>) -> usize {
        let mut seen: HashSet<u64> = self.articles.iter().map(|article| article.id).collect();
        let before = self.articles.len();
        self.articles
            .extend(batch.into_iter().filter(|article| seen.insert(article.id)));
        self.articles.len() - before
    }

    fn ticket(&self, kind: FetchKind) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            kind,
            count: self.batch_size,
        }
    }
}
