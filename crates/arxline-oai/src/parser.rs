//! OAI-PMH ListRecords page parser using quick-xml
//!
//! Streaming parser for one response page of the arXiv OAI-PMH endpoint
//! (namespaces http://www.openarchives.org/OAI/2.0/ and
//! http://arxiv.org/OAI/arXiv/). Elements are matched by local name so
//! prefixed and default-namespace documents both decode.

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::record::{HarvestRecord, PLACEHOLDER};

/// One parsed ListRecords response page.
#[derive(Debug, Default)]
pub struct Page {
    pub records: Vec<HarvestRecord>,
    /// (index within page, reason) for records that failed to decode.
    pub skipped: Vec<(usize, String)>,
    /// Continuation token. `None` when the element is absent or has empty
    /// text — both mean pagination is done.
    pub resumption_token: Option<String>,
}

/// Failure decoding a single record.
///
/// Only the schema-required fields produce this; optional fields fall
/// back to placeholders and never fail the record.
#[derive(Debug, PartialEq, Eq)]
pub enum DecodeError {
    MissingField(&'static str),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field <{field}>"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Raw per-record fields as found in the XML, before defaulting.
#[derive(Debug, Default)]
struct RawRecord {
    set_spec: Option<String>,
    id: Option<String>,
    created: Option<String>,
    updated: Option<String>,
    title: Option<String>,
    abstract_text: Option<String>,
    categories: Option<String>,
    doi: Option<String>,
    authors: Vec<String>,
}

/// Parse one response body.
///
/// A `noRecordsMatch` error response (or any body without a ListRecords
/// container) yields an empty page; malformed XML is an error and is
/// fatal for the partition being harvested.
pub fn parse_page(xml: &str) -> Result<Page> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = Page::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"ListRecords" => {
                parse_list_records(&mut reader, &mut page)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("XML parse error"),
            _ => {}
        }
        buf.clear();
    }

    Ok(page)
}

/// Parse the `<ListRecords>` container: records plus the resumption token.
fn parse_list_records(reader: &mut Reader<&[u8]>, page: &mut Page) -> Result<()> {
    let mut buf = Vec::new();
    let mut index = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"record" => {
                    let raw = parse_record(reader)?;
                    match build_record(raw) {
                        Ok(record) => page.records.push(record),
                        Err(e) => page.skipped.push((index, e.to_string())),
                    }
                    index += 1;
                }
                b"resumptionToken" => {
                    let text = read_text(reader)?;
                    if !text.is_empty() {
                        page.resumption_token = Some(text);
                    }
                }
                _ => {}
            },
            // Self-closing <resumptionToken/> means this is the last page.
            Event::Empty(_) => {}
            Event::End(e) if e.local_name().as_ref() == b"ListRecords" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Parse one `<record>`: header set-spec plus the arXiv metadata block.
fn parse_record(reader: &mut Reader<&[u8]>) -> Result<RawRecord> {
    let mut raw = RawRecord::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"header" => parse_header(reader, &mut raw)?,
                b"arXiv" => parse_info(reader, &mut raw)?,
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"record" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(raw)
}

fn parse_header(reader: &mut Reader<&[u8]>, raw: &mut RawRecord) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"setSpec" => {
                let text = read_text(reader)?;
                // Cross-listed records carry several setSpec entries; the
                // first one names the set the record was returned under.
                if raw.set_spec.is_none() {
                    raw.set_spec = Some(text);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"header" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Parse the arXiv-namespaced info block inside `<metadata>`.
fn parse_info(reader: &mut Reader<&[u8]>, raw: &mut RawRecord) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"id" => raw.id = Some(read_text(reader)?),
                b"created" => raw.created = Some(read_text(reader)?),
                b"updated" => raw.updated = Some(read_text(reader)?),
                b"title" => raw.title = Some(read_text(reader)?),
                b"abstract" => raw.abstract_text = Some(read_text(reader)?),
                b"categories" => raw.categories = Some(read_text(reader)?),
                b"doi" => raw.doi = Some(read_text(reader)?),
                b"authors" => parse_authors(reader, &mut raw.authors)?,
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"arXiv" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_authors(reader: &mut Reader<&[u8]>, authors: &mut Vec<String>) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"author" => {
                parse_author(reader, authors)?;
            }
            Event::End(e) if e.local_name().as_ref() == b"authors" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Parse one `<author>`: pair up keyname and forenames children by
/// position as "keyname forenames". Unpaired entries are dropped.
fn parse_author(reader: &mut Reader<&[u8]>, authors: &mut Vec<String>) -> Result<()> {
    let mut keynames = Vec::new();
    let mut forenames = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"keyname" => keynames.push(read_text(reader)?),
                b"forenames" => forenames.push(read_text(reader)?),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    for (keyname, forename) in keynames.into_iter().zip(forenames) {
        authors.push(format!("{keyname} {forename}"));
    }

    Ok(())
}

/// Apply field defaulting rules and produce the final record.
///
/// `title` and `abstract` are required by the upstream schema; their
/// absence fails this record only. Everything else defaults: placeholder
/// string for the identity/date fields, empty list for categories.
fn build_record(raw: RawRecord) -> Result<HarvestRecord, DecodeError> {
    let title = raw.title.ok_or(DecodeError::MissingField("title"))?;
    let abstract_text = raw
        .abstract_text
        .ok_or(DecodeError::MissingField("abstract"))?;

    Ok(HarvestRecord {
        arxiv_id: raw.id.unwrap_or_else(placeholder),
        title,
        abstract_text: abstract_text.trim().to_string(),
        primary_category: raw.set_spec.unwrap_or_else(placeholder),
        categories: raw
            .categories
            .map(|c| c.split_whitespace().map(String::from).collect())
            .unwrap_or_default(),
        authors: raw.authors,
        created: raw.created.unwrap_or_else(placeholder),
        updated: raw.updated.unwrap_or_else(placeholder),
        doi: raw
            .doi
            .and_then(|d| d.split_whitespace().next().map(String::from)),
    })
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

/// Read text content until the matching end tag, flattening nested markup.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::Start(_) => text.push_str(&read_text(reader)?),
            Event::End(_) => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal but structurally faithful ListRecords page: two records,
    /// one cross-listed, no resumption token.
    const SAMPLE_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2023-01-02T00:00:00Z</responseDate>
  <request verb="ListRecords">http://export.arxiv.org/oai2</request>
  <ListRecords>
    <record>
      <header>
        <identifier>oai:arXiv.org:2301.00001</identifier>
        <datestamp>2023-01-01</datestamp>
        <setSpec>cs</setSpec>
      </header>
      <metadata>
        <arXiv xmlns="http://arxiv.org/OAI/arXiv/">
          <id>2301.00001</id>
          <created>2023-01-01</created>
          <authors>
            <author><keyname>Doe</keyname><forenames>Jane</forenames></author>
            <author><keyname>Smith</keyname><forenames>John Q.</forenames></author>
          </authors>
          <title>Learning Things</title>
          <categories>cs.LG stat.ML</categories>
          <doi>10.1000/xyz</doi>
          <abstract>
            We learn things.
          </abstract>
        </arXiv>
      </metadata>
    </record>
    <record>
      <header>
        <identifier>oai:arXiv.org:2301.00002</identifier>
        <datestamp>2023-01-01</datestamp>
        <setSpec>cs</setSpec>
        <setSpec>stat</setSpec>
      </header>
      <metadata>
        <arXiv xmlns="http://arxiv.org/OAI/arXiv/">
          <id>2301.00002</id>
          <created>2023-01-01</created>
          <updated>2023-01-02</updated>
          <authors>
            <author><keyname>Roe</keyname><forenames>R.</forenames></author>
          </authors>
          <title>Counting Things</title>
          <categories>cs.DS</categories>
          <abstract>We count things.</abstract>
        </arXiv>
      </metadata>
    </record>
  </ListRecords>
</OAI-PMH>"#;

    #[test]
    fn parses_two_records_without_token() {
        let page = parse_page(SAMPLE_PAGE).unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.skipped.is_empty());
        assert!(page.resumption_token.is_none());

        let first = &page.records[0];
        assert_eq!(first.arxiv_id, "2301.00001");
        assert_eq!(first.title, "Learning Things");
        assert_eq!(first.abstract_text, "We learn things.");
        assert_eq!(first.primary_category, "cs");
        assert_eq!(first.categories, vec!["cs.LG", "stat.ML"]);
        assert_eq!(first.created, "2023-01-01");
        assert_eq!(first.updated, PLACEHOLDER);
    }

    #[test]
    fn pairs_author_keyname_and_forenames() {
        let page = parse_page(SAMPLE_PAGE).unwrap();
        assert_eq!(
            page.records[0].authors,
            vec!["Doe Jane", "Smith John Q."]
        );
        assert_eq!(page.records[1].authors, vec!["Roe R."]);
    }

    #[test]
    fn first_set_spec_wins_for_cross_listed() {
        let page = parse_page(SAMPLE_PAGE).unwrap();
        assert_eq!(page.records[1].primary_category, "cs");
    }

    #[test]
    fn doi_present_is_kept() {
        let page = parse_page(SAMPLE_PAGE).unwrap();
        assert_eq!(page.records[0].doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(page.records[1].doi, None);
    }

    fn one_record_page(info: &str) -> String {
        format!(
            r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <ListRecords>
    <record>
      <header><setSpec>math</setSpec></header>
      <metadata>
        <arXiv xmlns="http://arxiv.org/OAI/arXiv/">{info}</arXiv>
      </metadata>
    </record>
  </ListRecords>
</OAI-PMH>"#
        )
    }

    #[test]
    fn doi_keeps_only_first_whitespace_token() {
        let xml = one_record_page(
            "<id>1</id><title>T</title><abstract>A</abstract>\
             <doi>10.1000/xyz extra-text</doi>",
        );
        let page = parse_page(&xml).unwrap();
        assert_eq!(page.records[0].doi.as_deref(), Some("10.1000/xyz"));
    }

    #[test]
    fn empty_doi_element_is_absent() {
        let xml = one_record_page("<id>1</id><title>T</title><abstract>A</abstract><doi></doi>");
        let page = parse_page(&xml).unwrap();
        assert_eq!(page.records[0].doi, None);
    }

    #[test]
    fn optional_fields_default_to_placeholder() {
        let xml = one_record_page("<title>T</title><abstract>A</abstract>");
        let page = parse_page(&xml).unwrap();
        let record = &page.records[0];
        assert_eq!(record.arxiv_id, PLACEHOLDER);
        assert_eq!(record.created, PLACEHOLDER);
        assert_eq!(record.updated, PLACEHOLDER);
    }

    #[test]
    fn missing_set_spec_defaults_to_placeholder() {
        let xml = r#"<OAI-PMH><ListRecords><record>
            <metadata><arXiv><id>1</id><title>T</title><abstract>A</abstract></arXiv></metadata>
        </record></ListRecords></OAI-PMH>"#;
        let page = parse_page(xml).unwrap();
        assert_eq!(page.records[0].primary_category, PLACEHOLDER);
    }

    #[test]
    fn absent_categories_is_empty_list() {
        let xml = one_record_page("<id>1</id><title>T</title><abstract>A</abstract>");
        let page = parse_page(&xml).unwrap();
        assert!(page.records[0].categories.is_empty());
    }

    #[test]
    fn absent_authors_is_empty_list() {
        let xml = one_record_page("<id>1</id><title>T</title><abstract>A</abstract>");
        let page = parse_page(&xml).unwrap();
        assert!(page.records[0].authors.is_empty());
    }

    #[test]
    fn unpaired_keyname_is_dropped() {
        let xml = one_record_page(
            "<id>1</id><title>T</title><abstract>A</abstract>\
             <authors><author><keyname>Collaboration</keyname></author>\
             <author><keyname>Doe</keyname><forenames>Jane</forenames></author></authors>",
        );
        let page = parse_page(&xml).unwrap();
        assert_eq!(page.records[0].authors, vec!["Doe Jane"]);
    }

    #[test]
    fn missing_title_skips_only_that_record() {
        let xml = r#"<OAI-PMH><ListRecords>
    <record>
      <header><setSpec>cs</setSpec></header>
      <metadata><arXiv><id>1</id><abstract>A</abstract></arXiv></metadata>
    </record>
    <record>
      <header><setSpec>cs</setSpec></header>
      <metadata><arXiv><id>2</id><title>Kept</title><abstract>B</abstract></arXiv></metadata>
    </record>
</ListRecords></OAI-PMH>"#;
        let page = parse_page(xml).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].arxiv_id, "2");
        assert_eq!(page.skipped.len(), 1);
        assert_eq!(page.skipped[0].0, 0);
        assert!(page.skipped[0].1.contains("title"));
    }

    #[test]
    fn missing_abstract_skips_only_that_record() {
        let xml = one_record_page("<id>1</id><title>T</title>");
        let page = parse_page(&xml).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.skipped.len(), 1);
        assert!(page.skipped[0].1.contains("abstract"));
    }

    #[test]
    fn deleted_record_header_only_is_skipped() {
        let xml = r#"<OAI-PMH><ListRecords>
    <record>
      <header status="deleted"><setSpec>cs</setSpec></header>
    </record>
</ListRecords></OAI-PMH>"#;
        let page = parse_page(xml).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.skipped.len(), 1);
    }

    #[test]
    fn abstract_is_trimmed() {
        let page = parse_page(SAMPLE_PAGE).unwrap();
        assert_eq!(page.records[0].abstract_text, "We learn things.");
    }

    #[test]
    fn resumption_token_with_text() {
        let xml = r#"<OAI-PMH><ListRecords>
            <resumptionToken cursor="0" completeListSize="43750">6749232|1001</resumptionToken>
        </ListRecords></OAI-PMH>"#;
        let page = parse_page(xml).unwrap();
        assert_eq!(page.resumption_token.as_deref(), Some("6749232|1001"));
    }

    #[test]
    fn empty_resumption_token_terminates() {
        let xml = r#"<OAI-PMH><ListRecords>
            <resumptionToken cursor="1000" completeListSize="1100"></resumptionToken>
        </ListRecords></OAI-PMH>"#;
        let page = parse_page(xml).unwrap();
        assert!(page.resumption_token.is_none());
    }

    #[test]
    fn self_closing_resumption_token_terminates() {
        let xml = r#"<OAI-PMH><ListRecords><resumptionToken/></ListRecords></OAI-PMH>"#;
        let page = parse_page(xml).unwrap();
        assert!(page.resumption_token.is_none());
    }

    #[test]
    fn empty_list_records_yields_no_records() {
        let xml = r#"<OAI-PMH><ListRecords></ListRecords></OAI-PMH>"#;
        let page = parse_page(xml).unwrap();
        assert!(page.records.is_empty());
        assert!(page.skipped.is_empty());
        assert!(page.resumption_token.is_none());
    }

    #[test]
    fn no_records_match_error_response_is_empty() {
        let xml = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
            <error code="noRecordsMatch">no items found</error>
        </OAI-PMH>"#;
        let page = parse_page(xml).unwrap();
        assert!(page.records.is_empty());
        assert!(page.resumption_token.is_none());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let xml = r#"<OAI-PMH><ListRecords><record><header>"#;
        // Truncated body: either an explicit parse error or, at worst,
        // no records. arXiv truncation mid-page must never panic.
        let result = parse_page(xml);
        if let Ok(page) = result {
            assert!(page.records.is_empty());
        }
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        let xml = r#"<OAI-PMH><ListRecords></record></ListRecords></OAI-PMH>"#;
        assert!(parse_page(xml).is_err());
    }

    #[test]
    fn entities_are_unescaped() {
        let xml = one_record_page(
            "<id>1</id><title>P &amp; NP</title><abstract>A &lt; B</abstract>",
        );
        let page = parse_page(&xml).unwrap();
        assert_eq!(page.records[0].title, "P & NP");
        assert_eq!(page.records[0].abstract_text, "A < B");
    }
}
