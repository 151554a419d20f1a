//! Multi-partition harvester.
//!
//! Runs the pagination driver over every configured set, merges the
//! results in declared set order, and removes cross-listed duplicates
//! keeping the first occurrence.

use anyhow::{Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use arxline_core::{FetchError, ProgressContext, fetch_page, fetch_with_retry, fmt_num};

use crate::config::HarvestConfig;
use crate::driver::{SetHarvest, harvest_set_with};
use crate::record::HarvestRecord;

/// Totals for one completed harvest run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Summary {
    pub sets: usize,
    /// Sets abandoned after the retry policy ran out.
    pub failed: usize,
    pub pages: usize,
    /// Records decoded across all sets, before dedup.
    pub fetched: usize,
    /// Records remaining after dedup.
    pub unique: usize,
    /// Cross-listed records dropped by dedup.
    pub duplicates: usize,
    /// Records dropped because they failed to decode.
    pub skipped: usize,
}

impl Summary {
    pub fn log(&self) {
        log::info!(
            "harvest complete: {} unique records ({} fetched, {} duplicates, {} skipped) from {} sets in {} pages",
            fmt_num(self.unique),
            fmt_num(self.fetched),
            fmt_num(self.duplicates),
            fmt_num(self.skipped),
            self.sets,
            self.pages
        );
        if self.failed > 0 {
            log::warn!("{} of {} sets failed and were skipped", self.failed, self.sets);
        }
    }
}

/// Harvest every configured set from the live endpoint.
pub fn run(
    cfg: &HarvestConfig,
    progress: &ProgressContext,
) -> Result<(Vec<HarvestRecord>, Summary)> {
    run_with(cfg, progress, fetch_page)
}

/// Harvest with a pluggable page fetcher.
///
/// Retry wraps the fetcher here, so a mock fetcher in tests exercises
/// the same retry path as the live one. A partition that still fails
/// once retries run out is logged and skipped; the remaining partitions
/// harvest normally. All partitions failing yields an empty result, not
/// an error.
pub fn run_with(
    cfg: &HarvestConfig,
    progress: &ProgressContext,
    fetch: impl Fn(&str) -> Result<String, FetchError> + Sync,
) -> Result<(Vec<HarvestRecord>, Summary)> {
    let harvest_one = |set: &String| -> Result<SetHarvest> {
        let pb = progress.set_line(set);
        let result = harvest_set_with(cfg, set, &pb, |url| {
            fetch_with_retry(set, url, &cfg.retry, &pb, || fetch(url))
        });
        pb.finish_and_clear();
        result
    };

    // collect() keeps declared set order in both modes, so worker count
    // never changes the output.
    let results: Vec<Result<SetHarvest>> = if cfg.workers > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.workers)
            .build()
            .context("building worker pool")?;
        pool.install(|| cfg.sets.par_iter().map(harvest_one).collect())
    } else {
        cfg.sets.iter().map(harvest_one).collect()
    };

    let mut summary = Summary {
        sets: cfg.sets.len(),
        ..Summary::default()
    };
    let mut merged = Vec::new();
    for (set, result) in cfg.sets.iter().zip(results) {
        match result {
            Ok(harvest) => {
                summary.pages += harvest.pages;
                summary.skipped += harvest.skipped;
                merged.extend(harvest.records);
            }
            Err(e) => {
                summary.failed += 1;
                log::error!("{set}: partition failed, skipping: {e:#}");
            }
        }
    }
    summary.fetched = merged.len();

    let (records, duplicates) = dedup(merged);
    summary.unique = records.len();
    summary.duplicates = duplicates;
    summary.log();

    Ok((records, summary))
}

/// Drop records whose `arxiv_id` was already seen, keeping first
/// occurrence. Placeholder ids dedup like any other value.
fn dedup(records: Vec<HarvestRecord>) -> (Vec<HarvestRecord>, usize) {
    let before = records.len();
    let mut seen = FxHashSet::default();
    let kept: Vec<_> = records
        .into_iter()
        .filter(|r| seen.insert(r.arxiv_id.clone()))
        .collect();
    let duplicates = before - kept.len();
    (kept, duplicates)
}
