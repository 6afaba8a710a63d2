//! Turns a finished conversation into a form submission payload.

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::domain::model::{
    ConversationalFormConfig, ExtractionSchema, FieldType, FieldValidation,
};
use crate::domain::state::{CompletionReason, ConversationState, ConversationStatus};
use crate::domain::templates::TemplateRegistry;

use super::matcher::match_field;
use super::metadata::{
    AuthenticatedUser, ConversationMetadata, MappingReportRow, SchemaFieldSummary,
    TopicCoverageSnapshot,
};

/// One field of the target form: the contract extracted values are
/// mapped and validated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Dotted path in the submission payload, e.g. `contact.email`.
    pub path: String,
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FormField {
    pub fn new(path: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            field_type,
            required: false,
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }
}

/// Knobs controlling submission assembly.
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    pub include_transcript: bool,
    pub include_mapping_report: bool,
    /// Replaces both the inline and template-linked schema when set.
    pub schema_override: Option<ExtractionSchema>,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            include_transcript: true,
            include_mapping_report: true,
            schema_override: None,
        }
    }
}

/// The assembled submission: mapped values at their form paths plus the
/// `_meta` audit block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionData {
    #[serde(flatten)]
    pub data: Map<String, Value>,
    #[serde(rename = "_meta")]
    pub meta: ConversationMetadata,
}

/// What processing produced. `success: false` carries the error text;
/// warnings and missing-required lists are advisory either way.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub success: bool,
    pub submission_data: Option<SubmissionData>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub missing_required_fields: Vec<String>,
}

/// Internal processing failures. Callers never see this type; it is
/// folded into [`ProcessOutcome::error`].
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Maps a conversation's extractions onto the target form and assembles
/// the submission payload.
///
/// Never panics and never propagates: internal failures come back as
/// `{success: false, error}` so a finished conversation is always
/// answered with something.
pub fn process(
    state: &ConversationState,
    config: &ConversationalFormConfig,
    form_fields: &[FormField],
    user: Option<&AuthenticatedUser>,
    options: &ProcessorOptions,
    registry: Option<&TemplateRegistry>,
) -> ProcessOutcome {
    match try_process(state, config, form_fields, user, options, registry) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(conversation_id = %state.conversation_id, error = %err, "submission processing failed");
            ProcessOutcome {
                success: false,
                submission_data: None,
                error: Some(err.to_string()),
                warnings: Vec::new(),
                missing_required_fields: Vec::new(),
            }
        }
    }
}

fn try_process(
    state: &ConversationState,
    config: &ConversationalFormConfig,
    form_fields: &[FormField],
    user: Option<&AuthenticatedUser>,
    options: &ProcessorOptions,
    registry: Option<&TemplateRegistry>,
) -> Result<ProcessOutcome, MappingError> {
    let schema = resolve_schema(config, options, registry);

    let (data, unmapped, report) = map_extractions(state, &schema, form_fields);
    let (warnings, missing_required) = validate_mapped(&data, form_fields);

    let completed_at = state.completed_at.unwrap_or_else(Utc::now);
    let duration_seconds = completed_at
        .signed_duration_since(state.started_at)
        .num_seconds();

    let meta = ConversationMetadata {
        submission_type: "conversational".to_string(),
        conversation_id: state.conversation_id,
        transcript: if options.include_transcript {
            state.messages.clone()
        } else {
            Vec::new()
        },
        turn_count: state.turn_count,
        confidence: state.confidence,
        completion_reason: resolve_completion_reason(state, config),
        duration_seconds,
        topic_coverage: coverage_snapshot(state, config),
        schema: schema
            .fields
            .iter()
            .map(|f| SchemaFieldSummary {
                name: f.name.clone(),
                field_type: f.field_type,
                required: f.required,
            })
            .collect(),
        mapping_report: options.include_mapping_report.then_some(report),
        warnings: warnings.clone(),
        missing_required_fields: missing_required.clone(),
        unmapped_fields: (!unmapped.is_empty()).then_some(unmapped),
        submitted_by: user.cloned(),
    };

    Ok(ProcessOutcome {
        success: true,
        submission_data: Some(SubmissionData { data, meta }),
        error: None,
        warnings,
        missing_required_fields: missing_required,
    })
}

/// Schema precedence: explicit override, then the schema of the
/// template this config was instantiated from, then the inline schema.
fn resolve_schema(
    config: &ConversationalFormConfig,
    options: &ProcessorOptions,
    registry: Option<&TemplateRegistry>,
) -> ExtractionSchema {
    if let Some(schema) = &options.schema_override {
        return schema.clone();
    }
    if let (Some(template_id), Some(registry)) = (&config.template_id, registry) {
        if let Some(template) = registry.get(template_id) {
            if !template.schema.is_empty() {
                return template.schema.clone();
            }
        }
    }
    config.schema.clone()
}

/// Maps every extracted value onto a form field, in deterministic
/// order: schema order first, then leftover extraction keys sorted by
/// name.
fn map_extractions(
    state: &ConversationState,
    schema: &ExtractionSchema,
    form_fields: &[FormField],
) -> (Map<String, Value>, Map<String, Value>, Vec<MappingReportRow>) {
    let mut data = Map::new();
    let mut unmapped = Map::new();
    let mut report = Vec::new();

    let mut names: Vec<&str> = schema
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .filter(|name| state.partial_extractions.contains_key(*name))
        .collect();
    let mut extras: Vec<&str> = state
        .partial_extractions
        .keys()
        .map(String::as_str)
        .filter(|name| schema.field(name).is_none())
        .collect();
    extras.sort_unstable();
    names.extend(extras);

    for name in names {
        let value = state.partial_extractions[name].clone();
        match match_field(name, form_fields) {
            Some(matched) => {
                report.push(MappingReportRow {
                    source_field: name.to_string(),
                    form_path: Some(matched.form_path.clone()),
                    matched: true,
                    strategy: Some(matched.strategy),
                });
                data.insert(matched.form_path, value);
            }
            None => {
                report.push(MappingReportRow {
                    source_field: name.to_string(),
                    form_path: None,
                    matched: false,
                    strategy: None,
                });
                unmapped.insert(name.to_string(), value);
            }
        }
    }

    (data, unmapped, report)
}

fn validate_mapped(
    data: &Map<String, Value>,
    form_fields: &[FormField],
) -> (Vec<String>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut missing_required = Vec::new();

    for field in form_fields {
        let value = data.get(&field.path);
        match value {
            None | Some(Value::Null) => {
                if field.required {
                    missing_required.push(field.path.clone());
                }
            }
            Some(value) => validate_value(field, value, &mut warnings),
        }
    }

    (warnings, missing_required)
}

fn validate_value(field: &FormField, value: &Value, warnings: &mut Vec<String>) {
    let type_ok = match field.field_type {
        FieldType::String | FieldType::Enum => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Array => value.is_array(),
        FieldType::Object => value.is_object(),
    };
    if !type_ok {
        warnings.push(format!(
            "field '{}' expected {} but got {}",
            field.path,
            field.field_type.label(),
            value_kind(value)
        ));
        return;
    }

    let Some(rules) = &field.validation else {
        return;
    };

    if let Some(s) = value.as_str() {
        if let Some(min) = rules.min_length {
            if s.chars().count() < min {
                warnings.push(format!("field '{}' is shorter than {} characters", field.path, min));
            }
        }
        if let Some(max) = rules.max_length {
            if s.chars().count() > max {
                warnings.push(format!("field '{}' is longer than {} characters", field.path, max));
            }
        }
        if let Some(pattern) = &rules.pattern {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(s) {
                        warnings.push(format!(
                            "field '{}' does not match pattern '{}'",
                            field.path, pattern
                        ));
                    }
                }
                // An unparseable authored pattern must not sink the
                // submission.
                Err(_) => warnings.push(format!(
                    "field '{}' has an invalid pattern '{}', skipping check",
                    field.path, pattern
                )),
            }
        }
        if let Some(options) = &rules.options {
            if !options.is_empty() && !options.iter().any(|o| o == s) {
                warnings.push(format!(
                    "field '{}' value '{}' is not one of: {}",
                    field.path,
                    s,
                    options.join(", ")
                ));
            }
        }
    }

    if let Some(n) = value.as_f64() {
        if let Some(min) = rules.min {
            if n < min {
                warnings.push(format!("field '{}' is below the minimum {}", field.path, min));
            }
        }
        if let Some(max) = rules.max {
            if n > max {
                warnings.push(format!("field '{}' is above the maximum {}", field.path, max));
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The state-recorded reason wins; conversations finished before the
/// reason was threaded through fall back to derivation.
fn resolve_completion_reason(
    state: &ConversationState,
    config: &ConversationalFormConfig,
) -> CompletionReason {
    if let Some(reason) = state.completion_reason {
        return reason;
    }
    if state.status == ConversationStatus::Completed {
        return CompletionReason::Completed;
    }
    if state.turn_count >= config.limits.max_turns {
        return CompletionReason::TurnLimit;
    }
    CompletionReason::UserConfirmed
}

fn coverage_snapshot(
    state: &ConversationState,
    config: &ConversationalFormConfig,
) -> Vec<TopicCoverageSnapshot> {
    state
        .topic_coverage
        .iter()
        .map(|c| TopicCoverageSnapshot {
            topic_id: c.topic_id.clone(),
            name: config
                .topic(&c.topic_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| c.topic_id.clone()),
            covered: c.covered,
            depth: c.depth,
            turn_count: c.turn_count,
        })
        .collect()
}
