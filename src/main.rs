use std::io::Write;

use anyhow::{Context, Error};
use chrono::Utc;
use shift_ledger::event_ledger::summarize_events::summarize_events_from_json_file;
use shift_ledger::{Config, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,shift_ledger=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        snapshot = %config.snapshot_path.display(),
        time_zone = %config.default_time_zone.name(),
        "summarizing events"
    );
    let ledger = summarize_events_from_json_file(
        &config.snapshot_path,
        Utc::now(),
        config.default_time_zone,
    )?;

    let mut file = std::fs::File::create(&config.output_path).with_context(|| {
        format!("Failed to create file: {}", config.output_path.to_string_lossy())
    })?;
    file.write_all(serde_json::to_string_pretty(&ledger)?.as_bytes())?;

    tracing::info!(output = %config.output_path.display(), "ledger written");
    Ok(())
}
