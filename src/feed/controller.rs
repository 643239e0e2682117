use crate::article::ArticleRecord;

use super::state::{Completion, FeedState, FetchTicket};
use super::targets::TargetArena;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// Vertical extent of a card or of the viewport, in any consistent unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f32,
    pub bottom: f32,
}

impl Span {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn overlap(&self, other: &Span) -> f32 {
        (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0.0)
    }
}

/// What the feed needs from whatever is displaying it.
pub trait FeedSurface {
    /// Opaque handle used to scroll a card into view.
    type Target: Copy;

    /// A card for `article` now exists at `index`; returns its scroll handle.
    fn attach(&mut self, index: usize, article: &ArticleRecord) -> Option<Self::Target>;

    fn scroll_to(&mut self, target: Self::Target);

    /// Opens `url` without navigating away from the feed.
    fn open_in_new_context(&mut self, url: &str);

    fn exit(&mut self);

    fn listen_keys(&mut self);

    fn unlisten_keys(&mut self);

    fn render(&mut self, _state: &FeedState) {}
}

/// Couples the feed state with a surface: keyboard contract, scroll-driven
/// active tracking and the load-more triggers. Fetches are not performed
/// here; every method that wants data returns a [`FetchTicket`].
pub struct FeedController<V: FeedSurface> {
    state: FeedState,
    targets: TargetArena<V::Target>,
    surface: V,
}

impl<V: FeedSurface> FeedController<V> {
    pub fn new(surface: V, batch_size: usize) -> Self {
        Self {
            state: FeedState::new(batch_size),
            targets: TargetArena::new(),
            surface,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    pub fn target(&self, index: usize) -> Option<V::Target> {
        self.targets.get(index)
    }

    pub fn mount(&mut self) -> FetchTicket {
        self.surface.listen_keys();
        self.targets.clear();
        let ticket = self.state.mount();
        self.surface.render(&self.state);
        ticket
    }

    pub fn unmount(&mut self) {
        if !self.state.is_mounted() {
            return;
        }
        self.state.unmount();
        self.surface.unlisten_keys();
    }

    pub fn handle_key(&mut self, key: FeedKey) -> Option<FetchTicket> {
        if !self.state.is_mounted() {
            return None;
        }

        match key {
            FeedKey::Up => {
                self.navigate(-1);
                None
            }
            FeedKey::Down => {
                self.navigate(1);
                self.maybe_load_more()
            }
            FeedKey::Enter => {
                if let Some(article) = self.state.active_article() {
                    self.surface.open_in_new_context(&article.url);
                }
                None
            }
            FeedKey::Escape => {
                self.surface.exit();
                None
            }
        }
    }

    /// Passive tracking: the card with the largest visible overlap becomes
    /// active. `cards[i]` is the extent of card `i`.
    pub fn on_scroll(&mut self, cards: &[Span], viewport: Span) -> Option<FetchTicket> {
        if !self.state.is_mounted() {
            return None;
        }

        if let Some(index) = most_visible(cards, viewport) {
            if self.state.set_active(index) {
                self.surface.render(&self.state);
            }
        }
        self.maybe_load_more()
    }

    /// The sentinel below the last card became visible.
    pub fn on_trigger_visible(&mut self) -> Option<FetchTicket> {
        self.start_more()
    }

    pub fn retry(&mut self) -> Option<FetchTicket> {
        let ticket = self.state.retry()?;
        self.after_restart();
        Some(ticket)
    }

    pub fn refresh(&mut self) -> Option<FetchTicket> {
        let ticket = self.state.refresh()?;
        self.after_restart();
        Some(ticket)
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<ArticleRecord>, String>,
    ) -> Completion {
        let before = self.state.articles().len();
        let completion = self.state.complete(ticket, result);
        if completion == Completion::Stale {
            return completion;
        }

        for index in before..self.state.articles().len() {
            let article = &self.state.articles()[index];
            if let Some(target) = self.surface.attach(index, article) {
                self.targets.bind(index, target);
            }
        }
        self.surface.render(&self.state);
        completion
    }

    fn navigate(&mut self, delta: isize) {
        if !self.state.move_active(delta) {
            return;
        }
        if let Some(target) = self.targets.get(self.state.active_index()) {
            self.surface.scroll_to(target);
        }
        self.surface.render(&self.state);
    }

    fn maybe_load_more(&mut self) -> Option<FetchTicket> {
        if self.state.near_end() {
            self.start_more()
        } else {
            None
        }
    }

    fn start_more(&mut self) -> Option<FetchTicket> {
        let ticket = self.state.begin_load_more()?;
        self.surface.render(&self.state);
        Some(ticket)
    }

    fn after_restart(&mut self) {
        // a fresh first load drops every card
        if self.state.is_loading() {
            self.targets.clear();
        }
        self.surface.render(&self.state);
    }
}

impl<V: FeedSurface> Drop for FeedController<V> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn most_visible(cards: &[Span], viewport: Span) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, card) in cards.iter().enumerate() {
        let visible = card.overlap(&viewport);
        if visible <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, area)| visible > area) {
            best = Some((index, visible));
        }
    }
    best.map(|(index, _)| index)
}
