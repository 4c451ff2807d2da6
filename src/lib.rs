pub mod cli;
pub mod config;
pub mod consumer;
pub mod filter;
pub mod pipeline;
pub mod window;

use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io;

pub use cli::{Cli, ColorMode, cli_parse};
pub use config::{ConfigError, ConfigSections};
pub use consumer::{ConsumerInvocation, StartupError};
pub use filter::{CompiledPattern, FilterParseError, LineMatcher, MatchOptions};
pub use pipeline::{
    PipelineError, RecordSink, SearchOutcome, SearchPipeline, SearchStats, StructuredRecord,
    TableWriter, run_invocation,
};
pub use window::{TimeWindow, WindowError, resolve};

fn init_logging(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_level()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .try_init();
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    cli.color.apply();
    init_logging(&cli);

    // The only place the current instant is read.
    let baseline = Utc::now();
    let mut table = TableWriter::new(io::stdout().lock());
    let outcome = search(&cli, baseline, &mut table)?;

    if outcome.consumer_failed() {
        eprintln!(
            "{} kcat exited with {}; the matches above may be incomplete",
            "Warning:".yellow().bold(),
            outcome.exit_status
        );
    }

    Ok(())
}

/// Resolve the window, build the kcat command line and stream its output
/// through the search terms into `table`.
pub fn search<W: io::Write>(
    cli: &Cli,
    baseline: DateTime<Utc>,
    table: &mut TableWriter<W>,
) -> anyhow::Result<SearchOutcome> {
    let window = TimeWindow::resolve(&cli.begin, &cli.end, baseline)?;
    tracing::info!(
        begin_ms = window.begin_ms,
        end_ms = window.end_ms,
        "resolved time window"
    );
    if window.is_empty() {
        tracing::warn!("--end is earlier than --begin; nothing can match");
    }

    let pattern = CompiledPattern::compile(&cli.search, cli.match_options())?;
    if pattern.is_match_all() {
        tracing::info!("no search terms; every message matches");
    } else {
        tracing::info!(
            pattern = pattern.expression(),
            ignore_case = pattern.is_case_insensitive(),
            "compiled search terms"
        );
    }

    if cli.skip_verify {
        tracing::debug!("skipping consumer verification");
    } else {
        let banner = consumer::verify_consumer(&cli.kcat)?;
        tracing::debug!(%banner, "consumer verified");
    }

    let sections = ConfigSections::load(&cli.config)?;
    let invocation = ConsumerInvocation::build(
        cli.kcat.clone(),
        &cli.section,
        sections.section(&cli.section),
        window,
        &cli.topics,
    )?;
    tracing::info!(command = %invocation, "starting consumer");

    let outcome = run_invocation(&invocation, &pattern, table, cli.stderr_mode())?;
    Ok(outcome)
}
