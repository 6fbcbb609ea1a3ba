//! # Validator Module
//!
//! Checks the parsed model output, repairs recoverable gaps and builds the
//! final [`ExtractedJobData`].
//!
//! - `jobTitle`, `companyName`, `language` and `jobDescriptionText` must be
//!   strings when present. Absent or null values are left for the
//!   completeness gate to report.
//! - A missing description is synthesized from `notes` or from a generic
//!   template naming the company.
//! - Optional fields are read best-effort: numbers are stringified, anything
//!   else unexpected is dropped.
//!
//! [`completeness_gate`] is the last check of the pipeline and guarantees the
//! four required fields are present and non-blank.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::job::{ExtractedJobData, KeyDetail};
use crate::parser::json_type_name;

/// Error type for malformed model output
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected a JSON object, found {found}. Try again with the full job posting, or paste the complete posting text")]
    NotAnObject { found: &'static str },

    #[error("field '{field}' must be {expected}, found {found}. Try again with the full job posting, or paste the complete posting text")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Required fields are missing after the whole pipeline ran
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not extract {}. Try again with the full job posting, or paste the complete posting text", .missing.join(", "))]
pub struct ExtractionIncomplete {
    pub missing: Vec<&'static str>,
}

/// Validate and repair a parsed model response
pub fn validate(value: Value) -> Result<ExtractedJobData, ValidationError> {
    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ValidationError::NotAnObject {
                found: json_type_name(&other),
            });
        }
    };

    let job_title = string_field(&object, "jobTitle")?;
    let company_name = string_field(&object, "companyName")?;
    let language = string_field(&object, "language")?.map(|l| l.trim().to_lowercase());
    let job_description_text = string_field(&object, "jobDescriptionText")?;
    let notes = optional_string(&object, "notes");

    let job_description_text = match (job_description_text, &company_name) {
        (Some(text), _) if !text.trim().is_empty() => Some(text),
        (_, Some(company)) => {
            debug!(from_notes = notes.is_some(), "Synthesizing job description");
            Some(synthesize_description(company, notes.as_deref()))
        }
        (_, None) => notes.as_deref().map(|notes| synthesize_description("", Some(notes))),
    };

    Ok(ExtractedJobData {
        job_title,
        company_name,
        job_description_text,
        language,
        location: optional_string(&object, "location"),
        salary: optional_string(&object, "salary"),
        key_details: key_details(object.get("keyDetails")),
        job_prerequisites: optional_string(&object, "jobPrerequisites"),
        notes: None,
    })
}

/// Require the four mandatory fields to be present and non-blank
pub fn completeness_gate(data: &ExtractedJobData) -> Result<(), ExtractionIncomplete> {
    let fields = [
        ("jobTitle", &data.job_title),
        ("companyName", &data.company_name),
        ("jobDescriptionText", &data.job_description_text),
        ("language", &data.language),
    ];

    let missing: Vec<&'static str> = fields
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ExtractionIncomplete { missing })
    }
}

/// Fallback description when the model found none
pub fn synthesize_description(company_name: &str, notes: Option<&str>) -> String {
    match notes.map(str::trim).filter(|notes| !notes.is_empty()) {
        Some(notes) => format!(
            "No full job description was found in the posting. Summary notes: {}",
            notes
        ),
        None => format!(
            "No detailed job description could be extracted for this position at {}. \
             Please refer to the original job posting for full details.",
            company_name
        ),
    }
}

/// A string that may be absent or null, but not of another type
fn string_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ValidationError::WrongType {
            field,
            expected: "a string or null",
            found: json_type_name(other),
        }),
    }
}

fn optional_string(object: &Map<String, Value>, field: &str) -> Option<String> {
    let value = match object.get(field)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n"),
        other => {
            debug!(field, found = json_type_name(other), "Dropping unexpected optional value");
            return None;
        }
    };
    (!value.is_empty()).then_some(value)
}

fn key_details(value: Option<&Value>) -> Option<Vec<KeyDetail>> {
    let details: Vec<KeyDetail> = match value? {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let key = item.get("key").and_then(scalar_to_string)?;
                let value = item.get("value").and_then(scalar_to_string)?;
                Some(KeyDetail::new(key, value))
            })
            .collect(),
        Value::Object(map) => {
            let mut pairs: Vec<KeyDetail> = map
                .iter()
                .filter_map(|(key, value)| Some(KeyDetail::new(key.clone(), scalar_to_string(value)?)))
                .collect();
            pairs.sort_by(|a, b| a.key.cmp(&b.key));
            pairs
        }
        _ => return None,
    };
    (!details.is_empty()).then_some(details)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> Value {
        json!({
            "jobTitle": "Senior Backend Engineer",
            "companyName": "Acme Corp",
            "jobDescriptionText": "Build and run the order platform.",
            "language": "EN ",
            "location": "Berlin, Germany",
            "salary": 85000,
            "keyDetails": [{"key": "Contract", "value": "Permanent"}, {"key": "Hours"}],
            "jobPrerequisites": "- 5+ years Rust\n- Kubernetes",
            "notes": null
        })
    }

    #[test]
    fn test_valid_object() {
        let data = validate(complete()).unwrap();

        assert_eq!(data.title(), "Senior Backend Engineer");
        assert_eq!(data.company(), "Acme Corp");
        assert_eq!(data.description(), "Build and run the order platform.");
        assert_eq!(data.language(), "en");
        assert_eq!(data.salary.as_deref(), Some("85000"));
        assert_eq!(
            data.key_details,
            Some(vec![KeyDetail::new("Contract", "Permanent")])
        );
        assert!(completeness_gate(&data).is_ok());
    }

    #[test]
    fn test_description_synthesized_from_notes() {
        let mut value = complete();
        value["jobDescriptionText"] = Value::Null;
        value["notes"] = json!("Remote, full-stack, Berlin");

        let data = validate(value).unwrap();

        assert!(data.description().contains("Remote, full-stack, Berlin"));
        assert_eq!(data.notes, None);
    }

    #[test]
    fn test_description_synthesized_from_company() {
        let mut value = complete();
        value.as_object_mut().unwrap().remove("jobDescriptionText");

        let data = validate(value).unwrap();

        assert!(data.description().contains("Acme Corp"));
        assert!(data.description().contains("original job posting"));
    }

    #[test]
    fn test_null_required_field_is_left_to_the_gate() {
        let mut value = complete();
        value["companyName"] = Value::Null;
        value.as_object_mut().unwrap().remove("language");

        let data = validate(value).unwrap();
        let err = completeness_gate(&data).unwrap_err();

        assert_eq!(data.company_name, None);
        assert_eq!(err.missing, vec!["companyName", "language"]);
    }

    #[test]
    fn test_no_description_synthesized_without_company_or_notes() {
        let mut value = complete();
        value["companyName"] = Value::Null;
        value["jobDescriptionText"] = Value::Null;

        let data = validate(value).unwrap();

        assert_eq!(data.job_description_text, None);
        assert_eq!(
            completeness_gate(&data).unwrap_err().missing,
            vec!["companyName", "jobDescriptionText"]
        );
    }

    #[test]
    fn test_wrong_type() {
        let mut value = complete();
        value["jobTitle"] = json!(["Engineer"]);

        let err = validate(value).unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongType {
                field: "jobTitle",
                expected: "a string or null",
                found: "array",
            }
        );
        assert!(err.to_string().contains("full job posting"));

        let mut value = complete();
        value["jobDescriptionText"] = json!(42);
        assert!(matches!(
            validate(value),
            Err(ValidationError::WrongType {
                field: "jobDescriptionText",
                ..
            })
        ));
    }

    #[test]
    fn test_key_details_map_form() {
        let mut value = complete();
        value["keyDetails"] = json!({"Seniority": "Senior", "Contract": "Freelance", "Empty": ""});

        let data = validate(value).unwrap();

        assert_eq!(
            data.key_details,
            Some(vec![
                KeyDetail::new("Contract", "Freelance"),
                KeyDetail::new("Seniority", "Senior"),
            ])
        );
    }

    #[test]
    fn test_prerequisite_list_becomes_bullets() {
        let mut value = complete();
        value["jobPrerequisites"] = json!(["Rust", "gRPC"]);

        let data = validate(value).unwrap();

        assert_eq!(data.job_prerequisites.as_deref(), Some("- Rust\n- gRPC"));
    }

    #[test]
    fn test_gate_reports_blank_fields() {
        let mut value = complete();
        value["jobTitle"] = json!("   ");
        value["language"] = json!("");

        let data = validate(value).unwrap();
        let err = completeness_gate(&data).unwrap_err();

        assert_eq!(err.missing, vec!["jobTitle", "language"]);
        assert!(err.to_string().contains("jobTitle, language"));
    }

    #[test]
    fn test_rejects_non_object() {
        assert_eq!(
            validate(json!([1, 2])).unwrap_err(),
            ValidationError::NotAnObject { found: "array" }
        );
    }
}
