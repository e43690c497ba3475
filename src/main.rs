use alert_placefile::config::Config;
use alert_placefile::feed::FeedFetcher;
use alert_placefile::pipeline;
use alert_placefile::server::{self, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "alert-placefile",
    about = "Serve active weather alerts as a radar-viewer placefile"
)]
struct Args {
    /// Path to a TOML config file (optional)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Override the upstream feed URL
    #[arg(long, value_name = "URL")]
    feed_url: Option<String>,

    /// Print one placefile to stdout and exit instead of serving
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(addr) = args.listen {
        config.listen_addr = addr;
    }
    if let Some(url) = args.feed_url {
        config.feed_url = url;
        config.validate().context("Invalid --feed-url")?;
    }

    let client = reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")?;
    let fetcher =
        FeedFetcher::from_config(client, &config).context("Failed to configure feed fetcher")?;

    if args.once {
        let placefile = pipeline::generate(&fetcher)
            .await
            .context("Failed to generate placefile")?;
        print!("{placefile}");
        return Ok(());
    }

    let state = AppState::new(fetcher, config.cache_max_age_secs);
    let app = server::router().with_state(state);

    tracing::info!(addr = %config.listen_addr, feed_url = %config.feed_url, "Placefile server listening");
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
