//! arXiv OAI-PMH harvesting engine.
//!
//! Walks the ListRecords endpoint one set at a time, decoding each page
//! into [`HarvestRecord`]s and following resumption tokens until the
//! server stops issuing them. [`harvester::run`] drives all configured
//! sets and returns the merged, deduplicated record list.

pub mod config;
pub mod driver;
pub mod harvester;
pub mod parser;
pub mod partition;
pub mod record;

pub use config::{DEFAULT_BASE_URL, HarvestConfig};
pub use driver::{SetHarvest, harvest_set_with, initial_url, resumption_url};
pub use harvester::{Summary, run, run_with};
pub use parser::{DecodeError, Page, parse_page};
pub use partition::DEFAULT_SETS;
pub use record::{HarvestRecord, PLACEHOLDER};
