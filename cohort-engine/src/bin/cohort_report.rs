//! Cohort Report
//!
//! Loads the six cohort datasets from a directory, applies filters and prints
//! a summary report.

use anyhow::{Context, Result};
use clap::Parser;
use cohort_engine::logging::setup::{init_logging, LoggingConfig};
use cohort_engine::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the six dataset CSV files
    #[arg(long)]
    data_dir: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Only include students enrolled in this academic year
    #[arg(long)]
    year: Option<String>,

    /// Only include students of this school
    #[arg(long)]
    school: Option<String>,

    /// Only include students of this programme
    #[arg(long)]
    programme: Option<String>,

    /// Number of years to forecast enrollment for
    #[arg(long)]
    forecast: Option<usize>,

    /// Write the filtered students as CSV to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Log engine activity at debug level
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (logging, log) = log_configs(args.verbose);
    init_logging(logging).map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    let output = run(&args, log).await?;
    println!("{output}");
    Ok(())
}

/// Subscriber and engine logging settings for the chosen verbosity.
fn log_configs(verbose: bool) -> (LoggingConfig, LogConfig) {
    let (logging, log) = if verbose {
        (LoggingConfig::development(), LogConfig::verbose())
    } else {
        (LoggingConfig::default(), LogConfig::production())
    };
    (logging.with_engine_level(log.base_level), log)
}

fn filters(args: &Args) -> FilterSet {
    let mut filters = FilterSet::new();
    if let Some(year) = &args.year {
        filters = filters.with_year(year.as_str());
    }
    if let Some(school) = &args.school {
        filters = filters.with_school(school.as_str());
    }
    if let Some(programme) = &args.programme {
        filters = filters.with_programme(programme.as_str());
    }
    filters
}

/// Loads, filters, optionally exports, and renders the report.
async fn run(args: &Args, log: LogConfig) -> Result<String> {
    let mut engine = Engine::with_config(EngineConfig::default().with_log(log));

    let sources = SnapshotSources::from_directory(&args.data_dir, &DatasetPaths::default(), CsvOptions::default());
    engine
        .load_snapshot(&sources, |progress| {
            if args.verbose {
                eprintln!(
                    "[{}/{}] loaded {}",
                    progress.completed, progress.total, progress.dataset
                );
            }
        })
        .await
        .with_context(|| format!("failed to load datasets from {}", args.data_dir.display()))?;

    engine.apply_filters(filters(args));

    if let Some(path) = &args.export {
        let text = engine.export_students(b',')?;
        tokio::fs::write(path, text)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let report = engine.report(args.forecast);
    let output = if args.json {
        JsonFormatter::new().format(&report)?
    } else {
        HumanFormatter::new().format(&report)?
    };
    Ok(output)
}
