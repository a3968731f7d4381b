//! edgar-13d-watch — Binary Entrypoint
//! One full pipeline pass per invocation: enumerate recent SC 13D/13D-A
//! filings, extract Item 4, filter, dedup, write `feed.xml` and the
//! seen-hash state. Scheduling (cron/systemd timer) is external.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use edgar_13d_watch::client::EdgarClient;
use edgar_13d_watch::config::{self, SourceKind};
use edgar_13d_watch::feed::{self, ChannelMeta};
use edgar_13d_watch::locate::EdgarLocator;
use edgar_13d_watch::pipeline;
use edgar_13d_watch::seen::SeenStore;
use edgar_13d_watch::source::current_feed::CurrentFeedSource;
use edgar_13d_watch::source::daily_index::DailyIndexSource;
use edgar_13d_watch::source::FilingSource;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("edgar_13d_watch=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // .env for EDGAR_USER_AGENT / WATCH_CONFIG_PATH in local runs.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default().context("loading configuration")?;

    // Corrupt dedup state is fatal at startup; a silently emptied store
    // would re-alert on every known filing.
    let mut store = SeenStore::load(&cfg.state_path).context("loading seen-hash state")?;

    let client = EdgarClient::new(&cfg.user_agent, cfg.request_delay_ms)?;
    let sources: Vec<Box<dyn FilingSource>> = match cfg.source {
        SourceKind::Current => vec![Box::new(CurrentFeedSource::new(client.clone()))],
        SourceKind::Daily => vec![Box::new(DailyIndexSource::new(
            client.clone(),
            cfg.index_retry_attempts,
            cfg.index_retry_delay_ms,
        ))],
    };
    let locator = EdgarLocator::new(client);

    let (items, summary) = pipeline::run_once(&cfg, &sources, &locator, &mut store).await;

    let channel = ChannelMeta::for_mode(cfg.mode, cfg.lookback_days);
    let xml = feed::build_rss(&channel, &items, cfg.max_feed_items)?;
    feed::write_feed(&cfg.feed_path, &xml)
        .with_context(|| format!("writing feed to {}", cfg.feed_path.display()))?;
    store.flush().context("writing seen-hash state")?;

    tracing::info!(
        enumerated = summary.enumerated,
        located = summary.located,
        extracted = summary.extracted,
        matched = summary.matched,
        emitted = summary.emitted,
        feed = %cfg.feed_path.display(),
        "run complete"
    );
    Ok(())
}
