//! App events relay: maps one analytics track event to the Facebook App
//! Events activities payload and delivers it.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use app_events_core::{EventEnvelope, RelayConfig};
use app_events_delivery::FacebookAppEvents;
use app_events_mapper::{DestinationAdaptor, EventCategory, FacebookAppEventsAdaptor};
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "app-events-relay")]
#[command(about = "Map analytics track events to Facebook App Events and deliver them")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(long, env = "APP_EVENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Event JSON file, or "-" for stdin
    #[arg(long, default_value = "-")]
    event: String,

    /// Category to map as (defaults to classifying the event name)
    #[arg(long)]
    category: Option<EventCategory>,

    /// Facebook app id (overrides config)
    #[arg(long)]
    app_id: Option<String>,

    /// Print the mapped payload without delivering it
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn read_event(source: &str) -> anyhow::Result<EventEnvelope> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))?
    };
    serde_json::from_str(&raw).context("invalid event JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the payload.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app_events=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    // An explicit config file must load; otherwise fall back to env/defaults.
    let mut config = match cli.config.as_deref() {
        Some(path) => RelayConfig::load(Some(path))
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RelayConfig::load(None).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            RelayConfig::default()
        }),
    };

    if let Some(app_id) = cli.app_id {
        config.destination.app_id = Some(app_id);
    }

    let event = read_event(&cli.event)?;
    let category = cli
        .category
        .unwrap_or_else(|| EventCategory::from_event_name(&event.event));

    info!(
        event = %event.event,
        category = %category,
        endpoint = %config.delivery.endpoint,
        max_retries = config.delivery.max_retries,
        dry_run = cli.dry_run,
        "Relaying app event"
    );

    if cli.dry_run {
        let adaptor = FacebookAppEventsAdaptor::new(config.destination.settings());
        let payload = adaptor.prepare(category, &event)?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let integration = FacebookAppEvents::from_config(&config)?;
    let outcome = integration.send(category, &event).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
