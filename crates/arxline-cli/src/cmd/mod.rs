//! Subcommand implementations

pub mod daily;
pub mod harvest;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use arxline_core::{JsonlSink, fmt_num};
use arxline_oai::{HarvestRecord, Summary};

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date format: {e}"))
}

/// Write records as one JSON object per line; returns rows written.
pub(crate) fn write_records(path: &Path, records: &[HarvestRecord]) -> Result<usize> {
    let mut sink = JsonlSink::new(path)?;
    for record in records {
        sink.write(record)?;
    }
    Ok(sink.finalize()?)
}

/// Print a key-value summary table on stderr
pub(crate) fn print_summary(title: &str, summary: &Summary, path: &Path, elapsed: Duration) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    table.add_row(vec![
        Cell::new("Records"),
        Cell::new(format!(
            "{} unique ({} fetched, {} duplicates, {} skipped)",
            fmt_num(summary.unique),
            fmt_num(summary.fetched),
            fmt_num(summary.duplicates),
            fmt_num(summary.skipped)
        )),
    ]);
    table.add_row(vec![
        Cell::new("Sets"),
        Cell::new(format!(
            "{} in {} pages ({} failed)",
            summary.sets, summary.pages, summary.failed
        )),
    ]);
    table.add_row(vec![
        Cell::new("Output"),
        Cell::new(path.display().to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Time"),
        Cell::new(format!("{:.1}s", elapsed.as_secs_f64())),
    ]);
    eprintln!("\n{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_valid() {
        assert_eq!(
            parse_date("2023-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap()
        );
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("31/01/2023").is_err());
        assert!(parse_date("2023-13-01").is_err());
    }
}
