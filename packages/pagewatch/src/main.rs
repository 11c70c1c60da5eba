use anyhow::{Context, Result};
use clap::Parser;
use pagewatch::{
    batch, run, Config, HttpFetcher, OpenAiClassifier, OpenAiExtractor, SnapshotStore, WatchError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code for fatal input/configuration errors.
const EXIT_FATAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "pagewatch", about = "Topic-aware web page change detection")]
struct Args {
    /// Batch input file: JSON array of {url, topic} records
    #[arg(long)]
    input: PathBuf,

    /// Snapshot file (comparison baseline, replaced when changes exist)
    #[arg(long, default_value = "snapshot.json")]
    snapshot: PathBuf,

    /// Changes report file (written only when changes exist)
    #[arg(long, default_value = "changes.json")]
    changes: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pagewatch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match execute(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Run aborted");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn execute(args: Args) -> Result<ExitCode> {
    let config = Config::from_env().context("failed to load configuration")?;

    let items = batch::read_work_items(&args.input)?;
    tracing::info!(
        input = %args.input.display(),
        items = items.len(),
        model = %config.model,
        "Starting run"
    );

    let mut client = openai_client::OpenAIClient::new(&config.openai_api_key)
        .map_err(WatchError::ExtractionService)?;
    if let Some(base_url) = &config.openai_base_url {
        client = client.with_base_url(base_url);
    }

    let fetcher = HttpFetcher::new()?;
    let extractor = OpenAiExtractor::new(client.clone(), &config.model);
    let classifier = OpenAiClassifier::new(client, &config.model);
    let store = SnapshotStore::new(&args.snapshot);

    let report = run::run(
        &items,
        &store,
        &args.changes,
        &fetcher,
        &extractor,
        &classifier,
    )
    .await?;

    for (url, reason) in &report.skipped {
        tracing::warn!(url = %url, reason = %reason, "Item was skipped this run");
    }
    tracing::info!(
        processed = report.results.len(),
        changes = report.changes.len(),
        skipped = report.skipped.len(),
        "Run finished"
    );

    Ok(ExitCode::from(report.status.exit_code() as u8))
}
