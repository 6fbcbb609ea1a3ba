//! Structured job posting data produced by the extraction pipeline

use serde::{Deserialize, Serialize};

/// A single structured highlight of a posting, e.g. `("Contract", "Full-time")`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDetail {
    pub key: String,
    pub value: String,
}

impl KeyDetail {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Job posting data extracted from a page or pasted text
///
/// Once returned by [`crate::Extractor`], `job_title`, `company_name`,
/// `job_description_text` and `language` are always `Some`. The description
/// may be a synthesized fallback rather than text excerpted from the posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedJobData {
    /// Job title as written in the posting
    pub job_title: Option<String>,

    /// Hiring company
    pub company_name: Option<String>,

    /// Description of the role
    pub job_description_text: Option<String>,

    /// ISO 639-1 code of the posting's language
    pub language: Option<String>,

    pub location: Option<String>,

    pub salary: Option<String>,

    /// Structured highlights (contract type, seniority, ...)
    pub key_details: Option<Vec<KeyDetail>>,

    /// Bulleted requirements, always in English
    pub job_prerequisites: Option<String>,

    /// Reserved
    pub notes: Option<String>,
}

impl ExtractedJobData {
    pub fn title(&self) -> &str {
        self.job_title.as_deref().unwrap_or_default()
    }

    pub fn company(&self) -> &str {
        self.company_name.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.job_description_text.as_deref().unwrap_or_default()
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let data = ExtractedJobData {
            job_title: Some("Data Engineer".to_string()),
            company_name: Some("Globex".to_string()),
            key_details: Some(vec![KeyDetail::new("Contract", "Permanent")]),
            ..Default::default()
        };

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["jobTitle"], "Data Engineer");
        assert_eq!(json["companyName"], "Globex");
        assert_eq!(json["keyDetails"][0]["key"], "Contract");
        assert!(json["notes"].is_null());
    }

    #[test]
    fn test_accessors_default_to_empty() {
        let data = ExtractedJobData::default();
        assert_eq!(data.title(), "");
        assert_eq!(data.company(), "");
        assert_eq!(data.description(), "");
        assert_eq!(data.language(), "");
    }
}
