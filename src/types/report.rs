//! Completion Report
//!
//! The schema-validated structured object recovered once a conversation
//! reaches its terminal, data-gathering-complete state. Produced at most once
//! per conversation by the detector; the wire shape is camelCase JSON.

use serde::{Deserialize, Serialize};

/// Terminal structured payload of a mentoring conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    /// Narrative summary of the conversation
    pub summary: String,
    /// The requester's strongest skills
    pub top_skills: Vec<String>,
    /// Skills worth developing. Absent in flows that skip the gap analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_to_develop: Option<Vec<String>>,
    /// Recommended courses
    pub suggested_courses: Vec<CourseSuggestion>,
    /// Where the requester goes next
    pub next_step: NextStep,
}

/// One recommended course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSuggestion {
    pub title: String,
    pub description: String,
}

/// Discriminant for the follow-up flow after the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextStep {
    /// Move on to resume building
    Resume,
    /// Move on to job matching
    Jobs,
}

impl std::fmt::Display for NextStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextStep::Resume => write!(f, "resume"),
            NextStep::Jobs => write!(f, "jobs"),
        }
    }
}
