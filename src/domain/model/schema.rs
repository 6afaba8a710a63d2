//! Extraction schema: the typed target shape conversational answers
//! must ultimately populate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Value type of an extraction field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Enum,
    Array,
    Object,
}

impl FieldType {
    /// Human-readable label used in prompt and warning text.
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Enum => "enum",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

/// Optional validation rules attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regex the string value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values for enum-typed fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// One typed field in an extraction schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionField {
    /// Unique within a schema.
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    /// Topic this field is fed by, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
}

impl ExtractionField {
    /// Creates an optional field with no validation. Use the `with_`
    /// methods to adjust.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            description: String::new(),
            validation: None,
            topic_id: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        let validation = self.validation.get_or_insert_with(FieldValidation::default);
        validation.options = Some(options);
        self
    }

    pub fn with_topic(mut self, topic_id: impl Into<String>) -> Self {
        self.topic_id = Some(topic_id.into());
        self
    }

    /// Enum options, when present.
    pub fn options(&self) -> Option<&[String]> {
        self.validation
            .as_ref()
            .and_then(|v| v.options.as_deref())
            .filter(|o| !o.is_empty())
    }
}

/// Ordered set of extraction fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSchema {
    pub fields: Vec<ExtractionField>,
}

impl ExtractionSchema {
    pub fn new(fields: Vec<ExtractionField>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&ExtractionField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up the field linked to a topic, either through the field's
    /// `topic_id` or by name.
    pub fn field_for_topic(&self, topic_id: &str, extraction_field: Option<&str>) -> Option<&ExtractionField> {
        self.fields
            .iter()
            .find(|f| f.topic_id.as_deref() == Some(topic_id))
            .or_else(|| extraction_field.and_then(|name| self.field(name)))
    }
}

/// Validates a schema, returning human-readable authoring errors.
pub fn validate_schema(schema: &ExtractionSchema) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for field in &schema.fields {
        if field.name.trim().is_empty() {
            errors.push("schema field has an empty name".to_string());
        } else if !seen.insert(field.name.as_str()) {
            errors.push(format!("duplicate field name '{}'", field.name));
        }
        if field.field_type == FieldType::Enum && field.options().is_none() {
            errors.push(format!(
                "enum field '{}' must declare a non-empty options list",
                field.name
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enum_field(name: &str, options: &[&str]) -> ExtractionField {
        ExtractionField::new(name, FieldType::Enum)
            .with_options(options.iter().map(|s| s.to_string()).collect())
    }

    mod field_lookup {
        use super::*;

        #[test]
        fn finds_field_by_name() {
            let schema = ExtractionSchema::new(vec![
                ExtractionField::new("subject", FieldType::String),
                ExtractionField::new("urgency", FieldType::String),
            ]);
            assert!(schema.field("urgency").is_some());
            assert!(schema.field("missing").is_none());
        }

        #[test]
        fn finds_field_by_topic_link() {
            let schema = ExtractionSchema::new(vec![
                ExtractionField::new("category", FieldType::String).with_topic("issue-category"),
            ]);
            let field = schema.field_for_topic("issue-category", None).unwrap();
            assert_eq!(field.name, "category");
        }

        #[test]
        fn falls_back_to_extraction_field_name() {
            let schema = ExtractionSchema::new(vec![
                ExtractionField::new("category", FieldType::String),
            ]);
            let field = schema.field_for_topic("issue-category", Some("category")).unwrap();
            assert_eq!(field.name, "category");
        }

        #[test]
        fn topic_link_wins_over_name_fallback() {
            let schema = ExtractionSchema::new(vec![
                ExtractionField::new("other", FieldType::String).with_topic("t1"),
                ExtractionField::new("named", FieldType::String),
            ]);
            let field = schema.field_for_topic("t1", Some("named")).unwrap();
            assert_eq!(field.name, "other");
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn accepts_well_formed_schema() {
            let schema = ExtractionSchema::new(vec![
                ExtractionField::new("subject", FieldType::String).required(),
                enum_field("category", &["hardware", "software"]),
            ]);
            assert!(validate_schema(&schema).is_empty());
        }

        #[test]
        fn rejects_duplicate_field_names() {
            let schema = ExtractionSchema::new(vec![
                ExtractionField::new("subject", FieldType::String),
                ExtractionField::new("subject", FieldType::Number),
            ]);
            let errors = validate_schema(&schema);
            assert!(errors[0].contains("duplicate field name 'subject'"));
        }

        #[test]
        fn rejects_enum_without_options() {
            let schema = ExtractionSchema::new(vec![
                ExtractionField::new("category", FieldType::Enum),
            ]);
            let errors = validate_schema(&schema);
            assert!(errors[0].contains("non-empty options list"));
        }

        #[test]
        fn rejects_enum_with_empty_options() {
            let schema = ExtractionSchema::new(vec![enum_field("category", &[])]);
            let errors = validate_schema(&schema);
            assert_eq!(errors.len(), 1);
        }

        #[test]
        fn rejects_empty_field_name() {
            let schema = ExtractionSchema::new(vec![ExtractionField::new("", FieldType::String)]);
            let errors = validate_schema(&schema);
            assert!(errors[0].contains("empty name"));
        }
    }

    mod serde_shape {
        use super::*;

        #[test]
        fn field_type_serializes_to_snake_case() {
            let json = serde_json::to_string(&FieldType::Boolean).unwrap();
            assert_eq!(json, "\"boolean\"");
        }

        #[test]
        fn omits_absent_validation() {
            let field = ExtractionField::new("subject", FieldType::String);
            let json = serde_json::to_value(&field).unwrap();
            assert!(json.get("validation").is_none());
        }

        #[test]
        fn schema_round_trips() {
            let schema = ExtractionSchema::new(vec![
                enum_field("category", &["hardware", "software"]).required(),
            ]);
            let json = serde_json::to_string(&schema).unwrap();
            let back: ExtractionSchema = serde_json::from_str(&json).unwrap();
            assert_eq!(schema, back);
        }
    }
}
