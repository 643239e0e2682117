//! Client side of the article feed.
//!
//! [`FeedState`] is the pure state machine (articles, active card, loading
//! and error flags). [`FeedController`] wires it to a [`FeedSurface`] for
//! keyboard and scroll handling. [`run_feed`] drives a controller against an
//! [`ArticleSource`] on a tokio task.

pub mod controller;
pub mod driver;
pub mod source;
pub mod state;
pub mod targets;

pub use controller::{FeedController, FeedKey, FeedSurface, Span};
pub use driver::{run_feed, spawn_feed, DriverConfig, FeedEvent, FeedHandle};
pub use source::{ArticleSource, GatewayClient};
pub use state::{Completion, FeedPhase, FeedState, FetchKind, FetchTicket, LOAD_MORE_THRESHOLD};
pub use targets::TargetArena;

pub const EXCERPT_DISPLAY_CHARS: usize = 200;

/// Shortens `text` to `max_chars` characters, marking the cut with `...`.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_excerpts_are_untouched() {
        assert_eq!(truncate_excerpt("bison", 10), "bison");
        assert_eq!(truncate_excerpt("bison", 5), "bison");
    }

    #[test]
    fn long_excerpts_are_cut_on_char_boundaries() {
        assert_eq!(truncate_excerpt("bisons", 5), "bison...");
        assert_eq!(truncate_excerpt("Zürich Zürich", 2), "Zü...");
    }
}
