mod config;
mod db;
mod error;
mod extractor;
mod fetcher;
mod reconciler;
mod state;
mod summary;
mod types;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::SqliteSnapshotStore;
use crate::error::Result;
use crate::fetcher::HttpFetcher;
use crate::reconciler::{ReconcileReport, Reconciler};
use crate::types::LoopOutcome;

/// Keeps a local snapshot of the daily free-tips pages up to date and summarises a date range.
#[derive(Debug, Parser)]
#[command(name = "tipsbet", version)]
struct Cli {
    /// First day of the range (YYYY-MM-DD)
    start: NaiveDate,

    /// Last day of the range (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Snapshot database file, overrides SNAPSHOT_PATH
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// -v for debug logs, -vv for trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print the records of the range as JSON instead of the summary table
    #[arg(long)]
    json: bool,

    /// Skip the summary table
    #[arg(long)]
    quiet_summary: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match Config::from_env() {
        Ok(c) => c
            .with_verbosity(cli.verbose)
            .with_snapshot_path(cli.snapshot.clone()),
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cfg, cli).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config, cli: Cli) -> Result<()> {
    // --- Snapshot store ---
    let store = SqliteSnapshotStore::open(&cfg.snapshot_path).await?;

    // --- Fetcher ---
    let fetcher = HttpFetcher::new(&cfg)?;

    // --- Reconcile ---
    let today = Local::now().date_naive();
    let end = cli.end.unwrap_or(today);
    let reconciler = Reconciler::new(fetcher, store).with_today(today);
    let report = reconciler.reconcile(cli.start, end).await?;
    log_report(&report);

    // --- Output ---
    if report.view.is_empty() {
        info!("No tips stored for {}", report.requested);
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(report.view.records())?);
    } else if !cli.quiet_summary {
        let by_sport = summary::summarize(report.view.records());
        print!("{}", summary::render_table(&by_sport));
    }

    Ok(())
}

fn log_report(report: &ReconcileReport) {
    info!(
        event = "RUN_DONE",
        requested = %report.requested,
        fetches = report.fetch_calls(),
        rows_in_range = report.view.len(),
        rows_stored = report.full.len(),
        "RUN DONE     | {} | fetches: {} | rows in range: {} | stored: {}",
        report.requested,
        report.fetch_calls(),
        report.view.len(),
        report.full.len(),
    );

    for g in &report.gaps {
        if let LoopOutcome::AbortedPartial(reason) = &g.outcome {
            warn!(
                side = %g.gap.side,
                failed_day = %reason.day(),
                rows_kept = g.rows,
                "Gap {} {} stopped at {}; the remaining days are retried on the next run",
                g.gap.side,
                g.gap.range,
                reason.day(),
            );
        }
    }

    if report.is_partial() {
        warn!("Range {} is only partially up to date", report.requested);
    }
}
