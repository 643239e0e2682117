use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use wiktok::article::ArticleRecord;
use wiktok::feed::{
    spawn_feed, truncate_excerpt, DriverConfig, FeedController, FeedEvent, FeedKey, FeedPhase,
    FeedState, FeedSurface, GatewayClient, EXCERPT_DISPLAY_CHARS,
};

const HELP: &str = "keys: j/<enter> next, k previous, o open, m more, r retry, R refresh, q quit";

#[derive(Parser, Debug)]
#[clap(about = "Browse random encyclopedia articles from a running gateway", version)]
struct Args {
    /// Mount point of the gateway's article routes
    #[clap(short, long, default_value = "http://127.0.0.1:5000/api/wikipedia")]
    gateway: String,

    #[clap(short, long, default_value = "5")]
    batch_size: usize,

    /// Seconds before a batch request is abandoned
    #[clap(short, long, default_value = "15")]
    fetch_timeout: u64,
}

struct TerminalSurface {
    exit_tx: mpsc::UnboundedSender<()>,
    listening: Arc<AtomicBool>,
}

impl FeedSurface for TerminalSurface {
    type Target = usize;

    fn attach(&mut self, index: usize, _article: &ArticleRecord) -> Option<usize> {
        Some(index)
    }

    fn scroll_to(&mut self, target: usize) {
        debug!(card = target, "scrolled to card");
    }

    fn open_in_new_context(&mut self, url: &str) {
        if let Err(e) = webbrowser::open(url) {
            warn!(error = %e, url, "failed to open browser");
            println!("Open in your browser: {url}");
        }
    }

    fn exit(&mut self) {
        let _ = self.exit_tx.send(());
    }

    fn listen_keys(&mut self) {
        self.listening.store(true, Ordering::SeqCst);
        println!("{HELP}");
    }

    fn unlisten_keys(&mut self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn render(&mut self, state: &FeedState) {
        match state.phase() {
            FeedPhase::Initial => println!("Loading articles..."),
            FeedPhase::ErroredInitial => {
                println!("Oops! Something went wrong: {}", state.error().unwrap_or_default());
                println!("Type r to try again.");
            }
            phase => {
                if let Some(article) = state.active_article() {
                    print_card(state.active_index(), state.articles().len(), article);
                }
                match phase {
                    FeedPhase::LoadingMore => println!("(loading more...)"),
                    FeedPhase::ErroredMore => println!(
                        "Could not load more: {} (r to try again)",
                        state.error().unwrap_or_default()
                    ),
                    FeedPhase::Exhausted => {
                        println!("You've reached the end of the feed! Type R to refresh.")
                    }
                    _ => {}
                }
            }
        }
    }
}

fn print_card(index: usize, total: usize, article: &ArticleRecord) {
    println!();
    println!("[{}/{}] {}", index + 1, total, article.title);
    println!("{}", truncate_excerpt(&article.excerpt, EXCERPT_DISPLAY_CHARS));
    if let Some(image) = article.full_image_url.as_ref().or(article.thumbnail_url.as_ref()) {
        println!("image: {image}");
    }
    println!("{}", article.url);
}

fn parse_command(line: &str) -> Option<FeedEvent> {
    let event = match line {
        "" | "j" | "down" => FeedEvent::Key(FeedKey::Down),
        "k" | "up" => FeedEvent::Key(FeedKey::Up),
        "o" | "open" => FeedEvent::Key(FeedKey::Enter),
        "q" | "quit" => FeedEvent::Key(FeedKey::Escape),
        "m" | "more" => FeedEvent::TriggerVisible,
        "r" | "retry" => FeedEvent::Retry,
        "R" | "refresh" => FeedEvent::Refresh,
        _ => return None,
    };
    Some(event)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wiktok=warn")),
        )
        .init();

    let args = Args::parse();
    let timeout = Duration::from_secs(args.fetch_timeout);
    let client = GatewayClient::new(&args.gateway, Some(timeout))?;

    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
    let listening = Arc::new(AtomicBool::new(false));
    let surface = TerminalSurface {
        exit_tx,
        listening: listening.clone(),
    };

    let controller = FeedController::new(surface, args.batch_size);
    let handle = spawn_feed(
        controller,
        Arc::new(client),
        DriverConfig {
            fetch_timeout: Some(timeout),
        },
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = exit_rx.recv() => break,
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "failed to read stdin");
                        break;
                    }
                };
                if !listening.load(Ordering::SeqCst) {
                    continue;
                }
                match parse_command(line.trim()) {
                    Some(event) => {
                        if !handle.send(event).await {
                            break;
                        }
                    }
                    None => println!("{HELP}"),
                }
            }
        }
    }

    handle.stop().await?;
    Ok(())
}
