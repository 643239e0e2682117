use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::article::ArticleRecord;
use crate::error::FeedError;

use super::controller::{FeedController, FeedKey, FeedSurface, Span};
use super::source::ArticleSource;
use super::state::{Completion, FetchTicket};

/// Input from the hosting surface.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Key(FeedKey),
    Scrolled { cards: Vec<Span>, viewport: Span },
    TriggerVisible,
    Retry,
    Refresh,
    Unmount,
}

#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Per-fetch limit; `None` waits forever.
    pub fetch_timeout: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Some(Duration::from_secs(15)),
        }
    }
}

type Pending = BoxFuture<'static, (FetchTicket, Result<Vec<ArticleRecord>, String>)>;

pub struct FeedHandle<V: FeedSurface> {
    events: mpsc::Sender<FeedEvent>,
    join: JoinHandle<FeedController<V>>,
}

impl<V: FeedSurface> FeedHandle<V> {
    pub async fn send(&self, event: FeedEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Unmounts the feed and hands the controller back.
    pub async fn stop(self) -> Result<FeedController<V>, tokio::task::JoinError> {
        let _ = self.events.send(FeedEvent::Unmount).await;
        self.join.await
    }
}

pub fn spawn_feed<S, V>(
    controller: FeedController<V>,
    source: Arc<S>,
    config: DriverConfig,
) -> FeedHandle<V>
where
    S: ArticleSource,
    V: FeedSurface + Send + 'static,
    V::Target: Send,
{
    let (events, rx) = mpsc::channel(32);
    let join = tokio::spawn(run_feed(controller, source, config, rx));
    FeedHandle { events, join }
}

/// Mounts the feed and processes events and fetch results until `Unmount`
/// arrives or every sender is dropped. Fetches run concurrently with event
/// handling; results of superseded fetches are discarded by the controller.
pub async fn run_feed<S, V>(
    mut controller: FeedController<V>,
    source: Arc<S>,
    config: DriverConfig,
    mut events: mpsc::Receiver<FeedEvent>,
) -> FeedController<V>
where
    S: ArticleSource,
    V: FeedSurface,
{
    let mut pending: FuturesUnordered<Pending> = FuturesUnordered::new();

    let ticket = controller.mount();
    pending.push(fetch(source.clone(), ticket, config.fetch_timeout));

    loop {
        tokio::select! {
            event = events.recv() => {
                let ticket = match event {
                    None | Some(FeedEvent::Unmount) => {
                        info!("feed unmounted");
                        break;
                    }
                    Some(FeedEvent::Key(key)) => controller.handle_key(key),
                    Some(FeedEvent::Scrolled { cards, viewport }) => {
                        controller.on_scroll(&cards, viewport)
                    }
                    Some(FeedEvent::TriggerVisible) => controller.on_trigger_visible(),
                    Some(FeedEvent::Retry) => controller.retry(),
                    Some(FeedEvent::Refresh) => controller.refresh(),
                };

                if let Some(ticket) = ticket {
                    debug!(?ticket.kind, count = ticket.count, "fetch started");
                    pending.push(fetch(source.clone(), ticket, config.fetch_timeout));
                }
            }
            Some((ticket, result)) = pending.next(), if !pending.is_empty() => {
                match controller.complete(ticket, result) {
                    Completion::Applied { appended } => debug!(appended, "batch applied"),
                    Completion::Failed => {
                        warn!(error = ?controller.state().error(), "feed fetch failed")
                    }
                    Completion::Stale => debug!("stale batch dropped"),
                }
            }
        }
    }

    controller.unmount();
    controller
}

fn fetch<S: ArticleSource>(
    source: Arc<S>,
    ticket: FetchTicket,
    timeout: Option<Duration>,
) -> Pending {
    async move {
        let request = source.fetch_batch(ticket.count);
        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .unwrap_or(Err(FeedError::Timeout)),
            None => request.await,
        };
        (ticket, result.map_err(|e| e.to_string()))
    }
    .boxed()
}
