use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use tracing::info;

use crate::app::Orchestrator;
use crate::args::RunArgs;
use crate::config::{RunConfig, apply_config, load_config};
use crate::error::{AppError, AppResult, RunError};
use crate::http::ReqwestTransport;
use crate::shutdown::shutdown_channel;
use crate::shutdown_handlers::setup_signal_shutdown_handler;

/// Binary entry point: parse flags, merge config, run, report.
///
/// # Errors
///
/// Returns an error on invalid configuration, failed setup, report export
/// failure, or when thresholds fail.
pub fn run() -> AppResult<()> {
    let matches = RunArgs::command().get_matches();
    let args = RunArgs::from_arg_matches(&matches)?;

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args, &matches))
}

async fn run_async(mut args: RunArgs, matches: &clap::ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }
    let config = RunConfig::from_args(&args)?;
    let output_format = config.output_format;
    let summary_export = config.summary_export.clone();

    let transport = Arc::new(ReqwestTransport::new(&config.client)?);
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let result = Orchestrator::new(config, transport).run(shutdown_rx).await;
    signal_handle.abort();
    let report = result?;

    report.print(output_format)?;
    if let Some(path) = summary_export.as_deref() {
        report.export(path).await?;
        info!("Summary written to {}", path.display());
    }

    if !report.passed {
        return Err(AppError::run(RunError::ThresholdsFailed {
            failed: report.thresholds.failed_count(),
            total: report.thresholds.results.len(),
        }));
    }
    Ok(())
}
