//! Harvest subcommand - windowed harvest over all sets

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use arxline_core::{SharedProgress, cleanup_tmp_files};
use arxline_oai::HarvestConfig;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Start of the datestamp window (YYYY-MM-DD, inclusive)
    #[arg(value_parser = super::parse_date)]
    pub start: NaiveDate,

    /// End of the datestamp window (YYYY-MM-DD, inclusive)
    #[arg(value_parser = super::parse_date)]
    pub end: NaiveDate,

    /// Suffix for the output file name: {start}{suffix}.json
    #[arg(default_value = "")]
    pub suffix: String,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Sets to harvest (comma-separated; default: all)
    #[arg(long, value_delimiter = ',')]
    pub sets: Option<Vec<String>>,

    /// Number of sets harvested in parallel
    #[arg(short, long)]
    pub workers: Option<usize>,
}

/// Output file name: start date plus caller-chosen suffix.
fn output_path(dir: &Path, start: NaiveDate, suffix: &str) -> PathBuf {
    dir.join(format!("{start}{suffix}.json"))
}

pub fn run(args: HarvestArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    if args.end < args.start {
        anyhow::bail!("window end {} is before start {}", args.end, args.start);
    }

    let output_dir = args
        .output
        .unwrap_or_else(|| config.output.default_dir.clone());
    let path = output_path(&output_dir, args.start, &args.suffix);

    let mut cfg = HarvestConfig::new(args.start, args.end);
    cfg.base_url = config.oai.base_url.clone();
    cfg.retry = config.retry.policy();
    cfg.workers = args
        .workers
        .unwrap_or(config.workers.default)
        .clamp(1, config.workers.max);
    if let Some(sets) = args.sets {
        cfg.sets = sets;
    }

    log::info!("Harvesting {} sets, {} to {}", cfg.sets.len(), args.start, args.end);
    log::info!("  Output: {}", path.display());

    if output_dir.exists() {
        cleanup_tmp_files(&output_dir)?;
    }

    let started = Instant::now();
    let (records, summary) = arxline_oai::run(&cfg, progress.as_ref())?;
    write_and_report(&path, &records, &summary, started)
}

pub(crate) fn write_and_report(
    path: &Path,
    records: &[arxline_oai::HarvestRecord],
    summary: &arxline_oai::Summary,
    started: Instant,
) -> Result<()> {
    let rows = super::write_records(path, records)?;
    debug_assert_eq!(rows, summary.unique);
    super::print_summary("Harvest", summary, path, started.elapsed());
    Ok(())
}
