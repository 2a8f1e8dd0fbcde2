use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use dispatch_lite::config::{DispatchConfig, DEFAULT_PROCESSING_MS};
use dispatch_lite::dispatch::Dispatcher;
use dispatch_lite::report::Report;
use dispatch_lite::shutdown::interrupt_token;

#[derive(Parser, Debug)]
#[command(name = "dispatch-lite")]
#[command(version)]
#[command(about = "A priority work-dispatch simulator with cancellable workers")]
struct Args {
    /// Path the final report is written to
    #[arg(long, short = 'o', default_value = "result.txt")]
    output: PathBuf,

    /// Report format
    #[arg(long, short = 'f', default_value = "text")]
    format: OutputFormat,

    /// Per-job processing time in milliseconds; demo pauses scale with it
    #[arg(long, default_value_t = DEFAULT_PROCESSING_MS)]
    processing_ms: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> dispatch_lite::error::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let interrupted = interrupt_token();
    let dispatcher = Dispatcher::new(DispatchConfig::new(args.processing_ms));

    tracing::info!("Starting dispatch simulation");
    run_demo(&dispatcher, args.processing_ms, &interrupted).await;

    let report = Report::capture(&dispatcher).await;
    match args.format {
        OutputFormat::Text => report.write_text(&args.output).await?,
        OutputFormat::Json => report.write_json(&args.output).await?,
    }
    tracing::info!(path = %args.output.display(), "Report written");
    Ok(())
}

/// The scripted simulation. Pause lengths are ratios of the processing
/// duration, so a short `--processing-ms` runs the whole script quickly.
async fn run_demo(dispatcher: &Dispatcher, processing_ms: u64, interrupted: &CancellationToken) {
    // Two STANDARD jobs arrive before any worker exists.
    dispatcher.submit_job(false).await;
    dispatcher.submit_job(false).await;
    if pause(processing_ms / 10, interrupted).await {
        return;
    }

    // A HIGH job jumps the queue; the first worker picks it up ahead of the
    // earlier STANDARD jobs.
    dispatcher.submit_job(true).await;
    dispatcher.add_worker().await;
    if pause(processing_ms + processing_ms / 10, interrupted).await {
        return;
    }

    // Second worker, plus a late HIGH/STANDARD pair.
    dispatcher.add_worker().await;
    dispatcher.submit_job(true).await;
    dispatcher.submit_job(false).await;
    if pause(processing_ms + processing_ms / 5, interrupted).await {
        return;
    }

    // Evict the newest worker mid-flight; its job returns to the queue and
    // the remaining worker drains what it can before the report.
    dispatcher.remove_worker().await;
    pause(processing_ms + processing_ms / 2, interrupted).await;
}

/// Sleep for `ms`, returning early (`true`) when the demo was interrupted.
async fn pause(ms: u64, interrupted: &CancellationToken) -> bool {
    tokio::select! {
        _ = interrupted.cancelled() => true,
        _ = tokio::time::sleep(Duration::from_millis(ms)) => false,
    }
}
