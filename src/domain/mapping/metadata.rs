//! Audit metadata attached to every conversational submission.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::ConversationId;
use crate::domain::model::FieldType;
use crate::domain::state::{CompletionReason, Message};

use super::matcher::MatchStrategy;

/// Identity of the signed-in user a submission belongs to, when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One row of the mapping report: where one extracted value went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingReportRow {
    pub source_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_path: Option<String>,
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<MatchStrategy>,
}

/// Per-topic coverage at submission time, with the display name
/// resolved so downstream consumers need no config lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCoverageSnapshot {
    pub topic_id: String,
    pub name: String,
    pub covered: bool,
    pub depth: f64,
    pub turn_count: u32,
}

/// Shape summary of the extraction schema actually used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFieldSummary {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
}

/// The `_meta` block of a conversational submission.
///
/// Serialized camelCase, matching the submission payload convention of
/// the forms it feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadata {
    /// Always `"conversational"`, distinguishing these submissions from
    /// plain form posts.
    pub submission_type: String,
    pub conversation_id: ConversationId,
    /// Empty when transcript inclusion is disabled.
    pub transcript: Vec<Message>,
    pub turn_count: u32,
    pub confidence: f64,
    pub completion_reason: CompletionReason,
    pub duration_seconds: i64,
    pub topic_coverage: Vec<TopicCoverageSnapshot>,
    pub schema: Vec<SchemaFieldSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_report: Option<Vec<MappingReportRow>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_required_fields: Vec<String>,
    /// Extracted values with no matching form field. Omitted entirely
    /// when nothing was left unmapped, never an empty object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmapped_fields: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<AuthenticatedUser>,
}
