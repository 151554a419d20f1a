//! Arxline Core - Common infrastructure for the arXiv harvesting pipeline
//!
//! This crate provides the pieces shared by the harvesting engine and the
//! CLI: a blocking HTTP facade over a shared async client, the retry
//! policy, logging setup, progress reporting, and the JSONL output sink.

pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod sink;

// Re-exports for convenience
pub use http::{FetchError, fetch_page};
pub use logging::init_logging;
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::{RetryPolicy, fetch_with_retry};
pub use sink::{JsonlSink, cleanup_tmp_files};
