use std::io::IsTerminal;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use discourse_topic_tweetbot::config::Config;
use discourse_topic_tweetbot::discourse::DiscourseClient;
use discourse_topic_tweetbot::publisher::{
    review, PublishSettings, Publisher, TerminalKeys, TopicQueue,
};
use discourse_topic_tweetbot::twitter::TwitterClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    init_tracing()?;

    info!("Starting discourse-topic-tweetbot");

    // Load and validate configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        host = %config.discourse_host,
        poll_minutes = config.poll_interval.as_secs() / 60,
        refresh_minutes = config.topic_refresh_interval.as_secs() / 60,
        thumbnails = config.use_thumbnails,
        "Configuration loaded"
    );

    // Verify both sessions before entering the loop
    let forum = DiscourseClient::new(&config).context("Failed to create Discourse client")?;
    let api_user = forum
        .verify_credentials()
        .await
        .context("Discourse credential verification failed")?;
    info!(api_user = %api_user, "Discourse API session verified");

    let poster = TwitterClient::new(&config).context("Failed to create Twitter client")?;
    let screen_name = poster
        .verify_credentials()
        .await
        .context("Twitter credential verification failed")?;
    info!(screen_name = %screen_name, "Twitter API session verified");

    let interactive = std::io::stdin().is_terminal();

    // Review mode starts from zero so the current latest topics can be previewed
    let watermark = if interactive {
        config.newest_topic_id.or(Some(0))
    } else {
        config.newest_topic_id
    };

    let mut publisher = Publisher::new(
        forum,
        poster,
        PublishSettings::from_config(&config),
        TopicQueue::new(watermark),
    );

    if interactive {
        let summary = review(&mut publisher, &mut TerminalKeys::new(), &mut std::io::stdout())
            .await
            .context("Interactive review failed")?;
        info!(
            posted = summary.posted,
            failed = summary.failed,
            skipped = summary.skipped,
            quit = summary.quit,
            "Interactive review finished"
        );
        return Ok(());
    }

    tokio::select! {
        () = publisher.run_forever() => {},
        () = shutdown_signal() => {},
    }

    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,discourse_topic_tweetbot=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutting down...");
}
