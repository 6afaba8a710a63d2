//! The instantiated configuration a conversation engine runs with.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::limits::ConversationLimits;
use super::persona::ConversationPersona;
use super::schema::{validate_schema, ExtractionSchema};
use super::topic::{validate_topics, ConversationTopic};

/// Everything the engine needs to drive one conversational form:
/// objective, persona, limits, topics and the extraction schema.
///
/// Usually produced by applying a template (see
/// [`crate::domain::templates::TemplateRegistry::apply`]), but can be
/// authored directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationalFormConfig {
    /// What the conversation is trying to accomplish.
    pub objective: String,
    /// Optional background context rendered into the system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub persona: ConversationPersona,
    #[serde(default)]
    pub limits: ConversationLimits,
    #[serde(default)]
    pub topics: Vec<ConversationTopic>,
    #[serde(default)]
    pub schema: ExtractionSchema,
    /// Template this config was instantiated from, if any. Takes
    /// precedence during prompt-strategy resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Legacy flag selecting the IT-helpdesk strategy when no
    /// template id is set.
    #[serde(default)]
    pub it_helpdesk_mode: bool,
    /// Caller-supplied variables for templated prompt strategies.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub template_variables: HashMap<String, String>,
}

impl ConversationalFormConfig {
    /// Creates a minimal config with default persona and limits.
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            context: None,
            persona: ConversationPersona::default(),
            limits: ConversationLimits::default(),
            topics: Vec::new(),
            schema: ExtractionSchema::default(),
            template_id: None,
            it_helpdesk_mode: false,
            template_variables: HashMap::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_persona(mut self, persona: ConversationPersona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_limits(mut self, limits: ConversationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_topics(mut self, topics: Vec<ConversationTopic>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_schema(mut self, schema: ExtractionSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Finds a topic by id.
    pub fn topic(&self, id: &str) -> Option<&ConversationTopic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// Validates the whole config, returning human-readable authoring
    /// errors. Recoverable authoring mistakes never panic or error out.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.objective.trim().is_empty() {
            errors.push("objective cannot be empty".to_string());
        }
        errors.extend(validate_topics(&self.topics));
        errors.extend(validate_schema(&self.schema));
        errors.extend(self.limits.validate());
        errors
    }
}
