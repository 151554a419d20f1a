//! Daily subcommand - single-day harvest for cron
//!
//! Harvests a one-day window (today by default) and writes to
//! `{dest_prefix}/{year}/{date}.json`, ready for an unattended run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use clap::Args;

use arxline_core::SharedProgress;
use arxline_oai::HarvestConfig;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct DailyArgs {
    /// Harvest this date instead of today (YYYY-MM-DD)
    #[arg(long, value_parser = super::parse_date)]
    pub date: Option<NaiveDate>,

    /// Destination root (overrides ARXLINE_DEST_PREFIX and config;
    /// defaults to the configured output directory)
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Number of sets harvested in parallel
    #[arg(short, long)]
    pub workers: Option<usize>,
}

/// Year-partitioned output path under the destination root.
fn daily_path(prefix: &Path, date: NaiveDate) -> PathBuf {
    prefix
        .join(date.year().to_string())
        .join(format!("{date}.json"))
}

pub fn run(args: DailyArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let prefix = args
        .dest
        .or_else(|| config.daily.dest_prefix.clone())
        .unwrap_or_else(|| config.output.default_dir.clone());
    let path = daily_path(&prefix, date);

    let mut cfg = HarvestConfig::new(date, date);
    cfg.base_url = config.oai.base_url.clone();
    cfg.retry = config.retry.policy();
    cfg.workers = args
        .workers
        .unwrap_or(config.workers.default)
        .clamp(1, config.workers.max);

    log::info!("Daily harvest for {date}");
    log::info!("  Output: {}", path.display());

    let started = Instant::now();
    let (records, summary) = arxline_oai::run(&cfg, progress.as_ref())?;
    super::harvest::write_and_report(&path, &records, &summary, started)
}
