//! VTuber News Relay — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the provider, store, recipient
//! directory, and webhook sender into shared state.

use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vtuber_news_relay::api::AppState;
use vtuber_news_relay::collect::providers;
use vtuber_news_relay::config::RelayConfig;
use vtuber_news_relay::metrics::Metrics;
use vtuber_news_relay::notify::discord::DiscordSender;
use vtuber_news_relay::recipients::FileRecipientDirectory;
use vtuber_news_relay::scheduler::spawn_collect_scheduler;
use vtuber_news_relay::store::MemoryStore;
use vtuber_news_relay::validate::{HttpLinkChecker, LinkChecker};
use vtuber_news_relay::{api, SearchProvider};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vtuber_news_relay=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = RelayConfig::from_env();

    // Recorder must be installed before the first counter is touched.
    let metrics = Metrics::init();

    let checker: Arc<dyn LinkChecker> = Arc::new(HttpLinkChecker::new());
    let provider: Arc<dyn SearchProvider> = Arc::from(providers::from_config(&cfg, checker));

    let state = AppState {
        provider,
        store: Arc::new(MemoryStore::new()),
        recipients: Arc::new(FileRecipientDirectory::from_env()),
        sender: Arc::new(DiscordSender::new()),
        topics: Arc::new(cfg.topics.clone()),
        request_delay: Duration::from_millis(cfg.request_delay_ms),
        broadcast_delay: Duration::from_millis(cfg.broadcast_delay_ms),
        last_collection: Arc::new(RwLock::new(None)),
    };

    if let Some(secs) = cfg.collect_interval_secs {
        info!(interval_secs = secs, "background collection enabled");
        spawn_collect_scheduler(state.clone(), secs);
    }

    let router = api::create_router(state).merge(metrics.router());

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!(%addr, provider = ?cfg.provider, "vtuber-news-relay listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
