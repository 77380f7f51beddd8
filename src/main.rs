mod cli;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{CliOpts, LogFormat};
use colored::Colorize;
use dispatcher::{BatchDispatcher, HttpCallInitiator, SqlCallRecordStore};
use lib::database::SqliteDatabase;
use lib::timeutil::to_rfc3339;
use lib::types::{BatchConfig, BatchId, DispatchRequest, Recipient};
use lib::ConfigLoader;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::Layer;

fn setup_logging_subscriber(f: &LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_env_var("CALLBATCH_LOG")
        .try_from_env()
        .unwrap_or_else(|_| {
            "info,sqlx=warn,callbatchd=debug,dispatcher=debug,lib=debug"
                .into()
        });
    let stdout_layer = tracing_subscriber::fmt::layer().with_thread_names(true);
    let stdout_layer: Box<dyn Layer<_> + Send + Sync> = match f {
        | LogFormat::Pretty => stdout_layer.pretty().boxed(),
        | LogFormat::Compact => stdout_layer.compact().boxed(),
        | LogFormat::Json => stdout_layer.json().boxed(),
    };
    tracing_subscriber::registry()
        .with(stdout_layer.with_filter(env_filter))
        .init();
}

fn load_recipients(path: &str) -> Result<Vec<Recipient>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipient list '{path}'"))?;
    let recipients = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse recipient list '{path}'"))?;
    Ok(recipients)
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists before reading any configuration.
    dotenvy::dotenv().ok();

    let opts = CliOpts::parse();
    setup_logging_subscriber(&opts.log_format);

    let config = ConfigLoader::from_path(&opts.config)
        .load()
        .context("Failed to load configuration")?;

    let recipients = load_recipients(&opts.recipients)?;
    info!(
        "Loaded {} recipients from '{}'",
        recipients.len(),
        opts.recipients
    );

    let db = SqliteDatabase::connect(&config.dispatcher.database_uri)
        .await
        .context("Failed to connect to the call-data database")?;
    let record_store = SqlCallRecordStore::create(db)
        .await
        .context("Failed to prepare the call-data store")?;

    let initiator = HttpCallInitiator::new(
        &config.dispatcher.call_endpoint_url,
        Duration::from_secs(config.dispatcher.request_timeout_s),
    )?;

    let mut batch_config = BatchConfig::default();
    if let Some(batch_size) = opts.batch_size {
        batch_config.batch_size = batch_size;
    }
    if let Some(interval_minutes) = opts.interval_minutes {
        batch_config.interval_minutes = interval_minutes;
    }

    let request = DispatchRequest {
        batch_name: opts.batch_name,
        batch_id: opts.batch_id.map(BatchId::from),
        recipients,
        config: batch_config,
    };

    let dispatcher = BatchDispatcher::new(
        Arc::new(initiator),
        Arc::new(record_store),
    );
    let outcome = dispatcher.dispatch(request).await?;

    let summary = &outcome.summary;
    println!();
    println!("{}", "Batch completed".green().bold());
    println!(
        "  Batch:      {} ({})",
        summary.batch_name.bold(),
        summary.batch_id
    );
    println!("  Recipients: {}", summary.total_recipients);
    println!(
        "  Successful: {}",
        summary.successful_calls.to_string().green()
    );
    println!("  Failed:     {}", summary.failed_calls.to_string().red());
    println!("  Groups:     {}", summary.total_groups);
    println!("  Created:    {}", to_rfc3339(&summary.created_at));

    for result in outcome.results.iter().filter(|r| !r.success) {
        println!(
            "    {} {} ({}): {}",
            "call failed".red(),
            result.recipient_name,
            result.recipient_id,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    for result in outcome.results.iter().filter(|r| !r.db_inserted) {
        println!(
            "    {} {}: {}",
            "record not persisted".yellow(),
            result.recipient_id,
            result.db_error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}
