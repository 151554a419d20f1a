//! Harvest run configuration

use chrono::NaiveDate;

use arxline_core::RetryPolicy;

use crate::partition::DEFAULT_SETS;

/// ListRecords endpoint prefix. Query parameters are appended directly,
/// so the trailing `&` stays part of the base.
pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org/oai2?verb=ListRecords&";

/// Configuration for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Endpoint prefix including the verb, ending in `&`.
    pub base_url: String,
    /// Partitions to harvest, in order. Order is observable in the
    /// output: merged records keep declared set order.
    pub sets: Vec<String>,
    /// Inclusive start of the datestamp window.
    pub from: NaiveDate,
    /// Inclusive end of the datestamp window.
    pub until: NaiveDate,
    /// Sets harvested concurrently. 1 = sequential.
    pub workers: usize,
    pub retry: RetryPolicy,
}

impl HarvestConfig {
    /// Full-coverage config over the default set list.
    pub fn new(from: NaiveDate, until: NaiveDate) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sets: DEFAULT_SETS.iter().map(|s| s.to_string()).collect(),
            from,
            until,
            workers: 1,
            retry: RetryPolicy::default(),
        }
    }
}
