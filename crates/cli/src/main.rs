//! org-export entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: read arguments and environment through `clap`
//!    and validate them into an [`config::ExportConfig`] before any I/O.
//! 2. **Wire observability**: configure `tracing-subscriber` with a pretty or
//!    JSON layer and, when an endpoint is configured, an OpenTelemetry OTLP
//!    exporter. All spans and events emitted by every crate flow through it.
//! 3. **Construct infrastructure**: create the [`github::GithubClient`] (which
//!    serves as both the organization source and the handle resolver), the
//!    identity registry, and the row sink, and inject them into the
//!    [`driver::CollectionDriver`].
//! 4. **Report**: print the run summary to stdout and map the outcome to the
//!    process exit code (0 on success, 1 on configuration or run failure).

mod config;
mod csv_sink;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use collector::{EventSink, IdentityRegistry, MemoryRowSink, RowSink, RunId, TracingEventSink};
use driver::{CollectionDriver, CollectionSettings, RunSummary};
use github::{GithubClient, GithubConfig};
use tracing::{error, info};

use crate::config::{Args, ExportConfig, LogFormat, FALLBACK_TOKEN_VAR};
use crate::csv_sink::CsvFileSink;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let format = args.log_format;

    let _telemetry = match telemetry::init(format, args.otlp_endpoint.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let config = match ExportConfig::from_args(args, std::env::var(FALLBACK_TOKEN_VAR).ok()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(summary) => {
            match format {
                LogFormat::Json => match serde_json::to_string(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => error!(error = %e, "Could not serialise run summary"),
                },
                LogFormat::Pretty => println!("{summary}"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Export failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ExportConfig) -> anyhow::Result<RunSummary> {
    let run_id = RunId::new_random();
    info!(
        run_id = %run_id,
        organization = %config.organization,
        out_dir = %config.out_dir.display(),
        dry_run = config.dry_run,
        "Starting export"
    );

    let client = Arc::new(
        GithubClient::new(GithubConfig::new(config.token.clone()).with_api_url(&config.api_url))
            .context("building GitHub client")?,
    );
    let events: Arc<dyn EventSink> = Arc::new(TracingEventSink);
    let mut registry = IdentityRegistry::new(client.clone(), events.clone());

    let settings = CollectionSettings::new(config.organization.clone()).with_pacing(config.pacing);
    let driver = CollectionDriver::new(client, events, settings);

    let mut sink: Box<dyn RowSink> = if config.dry_run {
        Box::new(MemoryRowSink::new())
    } else {
        let sink = CsvFileSink::create(&config.out_dir)
            .await
            .with_context(|| format!("opening output directory {}", config.out_dir.display()))?;
        Box::new(sink)
    };

    let summary = driver.run(run_id, &mut registry, sink.as_mut()).await?;
    Ok(summary)
}
