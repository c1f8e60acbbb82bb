//! Structured Completion Detector
//!
//! Scans the winning attempt's text for the report sentinel and decodes the
//! trailing payload. An explicit state machine rather than a string search
//! plus a bare parse call: Searching → Decoding → Validating, terminating in
//! Continuing, Completed, or MalformedReport.
//!
//! Runs only after the cascade has returned a transport-level success. A
//! malformed payload is a content-level defect, not a transport failure, and
//! never triggers re-cascading.

use serde::Deserialize;
use serde_json::Value;

use crate::constants::detector::REPORT_SENTINEL;
use crate::types::{CompletionReport, PathwiseError, Result};

/// Terminal classification of one completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorOutcome {
    /// No sentinel: the conversation goes on and the text is the reply
    Continuing { reply: String },
    /// Sentinel plus a valid payload: the conversation's terminal state
    Completed { report: CompletionReport },
}

impl DetectorOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Non-terminal states of the scan
enum ScanState<'a> {
    Searching,
    Decoding { payload: &'a str },
    Validating { value: Value },
}

/// Classify one completion's raw text.
pub fn detect(raw: &str) -> Result<DetectorOutcome> {
    let mut state = ScanState::Searching;

    loop {
        state = match state {
            ScanState::Searching => match raw.find(REPORT_SENTINEL) {
                None => {
                    return Ok(DetectorOutcome::Continuing {
                        reply: raw.to_string(),
                    });
                }
                Some(index) => ScanState::Decoding {
                    payload: raw[index + REPORT_SENTINEL.len()..].trim_start(),
                },
            },
            ScanState::Decoding { payload } => {
                let mut deserializer = serde_json::Deserializer::from_str(payload);
                let value = Value::deserialize(&mut deserializer).map_err(|e| {
                    PathwiseError::malformed_report(format!("invalid JSON after sentinel: {}", e))
                })?;
                // Strict: nothing but whitespace may follow the JSON body
                deserializer.end().map_err(|_| {
                    PathwiseError::malformed_report("trailing data after report body")
                })?;
                ScanState::Validating { value }
            }
            ScanState::Validating { value } => {
                validate_shape(&value)?;
                let report: CompletionReport = serde_json::from_value(value)
                    .map_err(|e| PathwiseError::malformed_report(e.to_string()))?;
                return Ok(DetectorOutcome::Completed { report });
            }
        };
    }
}

/// Explicit shape checks ahead of the typed conversion, so failures name the
/// offending field instead of a serde path.
fn validate_shape(value: &Value) -> Result<()> {
    let object = value
        .as_object()
        .ok_or_else(|| PathwiseError::malformed_report("report body is not an object"))?;

    require_string(object, "summary")?;
    require_string_array(object, "topSkills")?;
    if object.contains_key("skillsToDevelop") {
        require_string_array(object, "skillsToDevelop")?;
    }

    let courses = object
        .get("suggestedCourses")
        .ok_or_else(|| PathwiseError::malformed_report("missing field 'suggestedCourses'"))?
        .as_array()
        .ok_or_else(|| PathwiseError::malformed_report("'suggestedCourses' is not an array"))?;
    for course in courses {
        let course = course.as_object().ok_or_else(|| {
            PathwiseError::malformed_report("'suggestedCourses' entry is not an object")
        })?;
        require_string(course, "title")?;
        require_string(course, "description")?;
    }

    let next_step = object
        .get("nextStep")
        .and_then(Value::as_str)
        .ok_or_else(|| PathwiseError::malformed_report("missing or non-string 'nextStep'"))?;
    if !matches!(next_step, "resume" | "jobs") {
        return Err(PathwiseError::malformed_report(format!(
            "'nextStep' must be one of resume, jobs; got '{}'",
            next_step
        )));
    }

    Ok(())
}

fn require_string(object: &serde_json::Map<String, Value>, field: &str) -> Result<()> {
    match object.get(field) {
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(PathwiseError::malformed_report(format!(
            "'{}' is not a string",
            field
        ))),
        None => Err(PathwiseError::malformed_report(format!(
            "missing field '{}'",
            field
        ))),
    }
}

fn require_string_array(object: &serde_json::Map<String, Value>, field: &str) -> Result<()> {
    let array = match object.get(field) {
        Some(Value::Array(array)) => array,
        Some(_) => {
            return Err(PathwiseError::malformed_report(format!(
                "'{}' is not an array",
                field
            )));
        }
        None => {
            return Err(PathwiseError::malformed_report(format!(
                "missing field '{}'",
                field
            )));
        }
    };

    if array.iter().any(|entry| !entry.is_string()) {
        return Err(PathwiseError::malformed_report(format!(
            "'{}' contains a non-string entry",
            field
        )));
    }

    Ok(())
}
