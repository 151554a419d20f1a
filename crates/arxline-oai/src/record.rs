//! Harvested record model

use serde::Serialize;

/// Placeholder stored for optional header/date fields the source omitted.
///
/// The downstream JSONL consumers distinguish "unknown" from empty via
/// this single-space sentinel, so it is part of the output contract.
pub const PLACEHOLDER: &str = " ";

/// One publication's metadata as harvested from the OAI endpoint.
///
/// Immutable once decoded; `arxiv_id` is the dedup key across the whole
/// harvest. `primary_category` is the set the record was returned under,
/// not necessarily the paper's canonical category — a cross-listed paper
/// shows up under several sets and is kept only for the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestRecord {
    pub arxiv_id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub primary_category: String,
    pub categories: Vec<String>,
    pub authors: Vec<String>,
    pub created: String,
    pub updated: String,
    /// First whitespace token of the raw DOI field; `None` when the
    /// source has no DOI element. Serialized as JSON null for parity
    /// with the existing output files.
    pub doi: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HarvestRecord {
        HarvestRecord {
            arxiv_id: "2301.00001".to_string(),
            title: "A Title".to_string(),
            abstract_text: "An abstract.".to_string(),
            primary_category: "cs".to_string(),
            categories: vec!["cs.LG".to_string(), "stat.ML".to_string()],
            authors: vec!["Doe Jane".to_string()],
            created: "2023-01-01".to_string(),
            updated: PLACEHOLDER.to_string(),
            doi: None,
        }
    }

    #[test]
    fn serializes_abstract_under_renamed_key() {
        let json: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["abstract"], "An abstract.");
        assert!(json.get("abstract_text").is_none());
    }

    #[test]
    fn missing_doi_serializes_as_null() {
        let json: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert!(json["doi"].is_null());
    }

    #[test]
    fn categories_serialize_as_list() {
        let json: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["categories"].as_array().unwrap().len(), 2);
    }
}
