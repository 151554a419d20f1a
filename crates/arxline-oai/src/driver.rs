//! Pagination driver: walks one partition page by page.
//!
//! The first page is requested with the full date-window query; every
//! page after that is requested with the server-issued resumption token
//! ONLY — the endpoint rejects tokens combined with other parameters.

use anyhow::{Context, Result};
use indicatif::ProgressBar;

use arxline_core::{FetchError, fmt_num};
use chrono::NaiveDate;

use crate::config::HarvestConfig;
use crate::parser::parse_page;
use crate::record::HarvestRecord;

/// Everything harvested from one partition.
#[derive(Debug, Default)]
pub struct SetHarvest {
    /// Records in page order, duplicates not yet removed.
    pub records: Vec<HarvestRecord>,
    pub pages: usize,
    /// Records dropped because they failed to decode.
    pub skipped: usize,
}

/// URL for the first page of a partition.
pub fn initial_url(base_url: &str, set: &str, from: NaiveDate, until: NaiveDate) -> String {
    format!("{base_url}from={from}&until={until}&metadataPrefix=arXiv&set={set}")
}

/// URL for a continuation page. The token is interpolated verbatim; the
/// server issues tokens that are already URL-safe.
pub fn resumption_url(base_url: &str, token: &str) -> String {
    format!("{base_url}resumptionToken={token}")
}

/// Pagination loop with a pluggable page fetcher.
///
/// `fetch` receives the exact URL to request and returns the response
/// body; retry behavior belongs to the fetcher. Tests drive this with
/// canned bodies instead of the network.
pub fn harvest_set_with(
    cfg: &HarvestConfig,
    set: &str,
    pb: &ProgressBar,
    mut fetch: impl FnMut(&str) -> Result<String, FetchError>,
) -> Result<SetHarvest> {
    let mut url = initial_url(&cfg.base_url, set, cfg.from, cfg.until);
    let mut harvest = SetHarvest::default();

    loop {
        let body = fetch(&url).with_context(|| format!("{set}: fetching {url}"))?;
        let page = parse_page(&body).with_context(|| format!("{set}: parsing {url}"))?;

        for (index, reason) in &page.skipped {
            log::warn!("{set}: skipping record {index} on page {}: {reason}", harvest.pages + 1);
        }

        harvest.pages += 1;
        harvest.skipped += page.skipped.len();
        harvest.records.extend(page.records);
        pb.set_message(format!(
            "{} records, page {}",
            fmt_num(harvest.records.len()),
            harvest.pages
        ));

        match page.resumption_token {
            Some(token) => url = resumption_url(&cfg.base_url, &token),
            None => break,
        }
    }

    log::info!(
        "{set}: {} records in {} pages ({} skipped)",
        fmt_num(harvest.records.len()),
        harvest.pages,
        harvest.skipped
    );
    Ok(harvest)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use arxline_core::RetryPolicy;

    fn test_config() -> HarvestConfig {
        let mut cfg = HarvestConfig::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        );
        cfg.retry = RetryPolicy::bounded(3, Duration::ZERO);
        cfg
    }

    fn page_body(ids: &[&str], token: Option<&str>) -> String {
        let records: String = ids
            .iter()
            .map(|id| {
                format!(
                    "<record><header><setSpec>cs</setSpec></header>\
                     <metadata><arXiv><id>{id}</id><title>T</title>\
                     <abstract>A</abstract></arXiv></metadata></record>"
                )
            })
            .collect();
        let token = match token {
            Some(t) => format!("<resumptionToken>{t}</resumptionToken>"),
            None => "<resumptionToken/>".to_string(),
        };
        format!("<OAI-PMH><ListRecords>{records}{token}</ListRecords></OAI-PMH>")
    }

    #[test]
    fn initial_url_carries_window_and_set() {
        let url = initial_url(
            "http://export.arxiv.org/oai2?verb=ListRecords&",
            "physics:hep-th",
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
        );
        assert_eq!(
            url,
            "http://export.arxiv.org/oai2?verb=ListRecords&\
             from=2023-01-01&until=2023-01-31&metadataPrefix=arXiv&set=physics:hep-th"
        );
    }

    #[test]
    fn resumption_url_drops_window_params() {
        let url = resumption_url("http://x/oai2?verb=ListRecords&", "6749232|1001");
        assert_eq!(url, "http://x/oai2?verb=ListRecords&resumptionToken=6749232|1001");
    }

    #[test]
    fn follows_tokens_until_final_page() {
        let cfg = test_config();
        let pb = ProgressBar::hidden();
        let mut requested = Vec::new();
        let harvest = harvest_set_with(&cfg, "cs", &pb, |url| {
            requested.push(url.to_string());
            Ok(match requested.len() {
                1 => page_body(&["1", "2"], Some("tok-a")),
                2 => page_body(&["3"], Some("tok-b")),
                _ => page_body(&["4"], None),
            })
        })
        .unwrap();

        assert_eq!(harvest.pages, 3);
        assert_eq!(harvest.records.len(), 4);
        assert!(requested[0].contains("metadataPrefix=arXiv&set=cs"));
        assert!(requested[1].ends_with("resumptionToken=tok-a"));
        assert!(requested[2].ends_with("resumptionToken=tok-b"));
    }

    #[test]
    fn single_page_makes_one_request() {
        let cfg = test_config();
        let pb = ProgressBar::hidden();
        let mut calls = 0;
        let harvest = harvest_set_with(&cfg, "cs", &pb, |_| {
            calls += 1;
            Ok(page_body(&["1"], None))
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(harvest.records.len(), 1);
    }

    #[test]
    fn preserves_arrival_order_across_pages() {
        let cfg = test_config();
        let pb = ProgressBar::hidden();
        let mut calls = 0;
        let harvest = harvest_set_with(&cfg, "cs", &pb, |_| {
            calls += 1;
            Ok(if calls == 1 {
                page_body(&["a", "b"], Some("t"))
            } else {
                page_body(&["c"], None)
            })
        })
        .unwrap();
        let ids: Vec<_> = harvest.records.iter().map(|r| r.arxiv_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn counts_skipped_records() {
        let cfg = test_config();
        let pb = ProgressBar::hidden();
        let body = "<OAI-PMH><ListRecords>\
            <record><metadata><arXiv><id>1</id><abstract>A</abstract></arXiv></metadata></record>\
            <record><metadata><arXiv><id>2</id><title>T</title><abstract>A</abstract></arXiv></metadata></record>\
            </ListRecords></OAI-PMH>";
        let harvest = harvest_set_with(&cfg, "cs", &pb, |_| Ok(body.to_string())).unwrap();
        assert_eq!(harvest.records.len(), 1);
        assert_eq!(harvest.skipped, 1);
    }

    #[test]
    fn fetch_error_aborts_partition() {
        let cfg = test_config();
        let pb = ProgressBar::hidden();
        let result = harvest_set_with(&cfg, "cs", &pb, |_| {
            Err(FetchError::Io(std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "disk full",
            )))
        });
        assert!(result.is_err());
    }

    #[test]
    fn malformed_page_aborts_partition() {
        let cfg = test_config();
        let pb = ProgressBar::hidden();
        let result = harvest_set_with(&cfg, "cs", &pb, |_| {
            Ok("<OAI-PMH><ListRecords></record></ListRecords></OAI-PMH>".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn no_records_match_yields_empty_harvest() {
        let cfg = test_config();
        let pb = ProgressBar::hidden();
        let body = r#"<OAI-PMH><error code="noRecordsMatch">none</error></OAI-PMH>"#;
        let harvest = harvest_set_with(&cfg, "econ", &pb, |_| Ok(body.to_string())).unwrap();
        assert!(harvest.records.is_empty());
        assert_eq!(harvest.pages, 1);
    }
}
