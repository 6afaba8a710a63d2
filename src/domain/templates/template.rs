//! Template definitions and the override mechanism that customizes them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::model::{
    ConversationLimits, ConversationPersona, ConversationTopic, ConversationalFormConfig,
    ExtractionSchema,
};
use crate::domain::prompts::{
    DefaultStrategy, HelpdeskStrategy, PromptStrategy, TemplatedStrategy,
};

/// Broad grouping used for browsing and filtering templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    Support,
    Feedback,
    Intake,
    Application,
    General,
}

/// Which prompt strategy a template instantiates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Default,
    Helpdesk,
    /// Authored prompt text with `{{variable}}` placeholders.
    Templated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        system_prompt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wrap_up_prompt: Option<String>,
    },
}

impl StrategyKind {
    /// Builds the prompt strategy this kind names.
    pub fn instantiate(&self) -> Box<dyn PromptStrategy> {
        match self {
            StrategyKind::Default => Box::new(DefaultStrategy::new()),
            StrategyKind::Helpdesk => Box::new(HelpdeskStrategy::new()),
            StrategyKind::Templated {
                system_prompt,
                wrap_up_prompt,
            } => Box::new(TemplatedStrategy::new(
                system_prompt.clone(),
                wrap_up_prompt.clone(),
            )),
        }
    }
}

/// Descriptive metadata shown when browsing templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Rough expected conversation length shown to authors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
}

/// A reusable conversational form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTemplate {
    /// Unique within a registry.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: TemplateCategory,
    pub objective: String,
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
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub metadata: TemplateMetadata,
}

impl ConversationTemplate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: TemplateCategory,
        objective: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            objective: objective.into(),
            context: None,
            persona: ConversationPersona::default(),
            limits: ConversationLimits::default(),
            topics: Vec::new(),
            schema: ExtractionSchema::default(),
            strategy: StrategyKind::Default,
            metadata: TemplateMetadata::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
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

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Instantiates a config from this template. The result is a deep
    /// copy; mutating it never touches the template.
    pub fn to_config(&self) -> ConversationalFormConfig {
        let mut config = ConversationalFormConfig::new(self.objective.clone())
            .with_persona(self.persona.clone())
            .with_limits(self.limits.clone())
            .with_topics(self.topics.clone())
            .with_schema(self.schema.clone());
        config.context = self.context.clone();
        config.template_id = Some(self.id.clone());
        config
    }
}

/// Caller customizations applied on top of a template at instantiation.
///
/// Only the fields that are set replace the template's values; topics
/// and schema are replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<ConversationPersona>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ConversationLimits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<ConversationTopic>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ExtractionSchema>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub template_variables: HashMap<String, String>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.objective.is_none()
            && self.context.is_none()
            && self.persona.is_none()
            && self.limits.is_none()
            && self.topics.is_none()
            && self.schema.is_none()
            && self.template_variables.is_empty()
    }

    /// Applies these overrides to a config in place.
    pub fn apply_to(&self, config: &mut ConversationalFormConfig) {
        if let Some(objective) = &self.objective {
            config.objective = objective.clone();
        }
        if let Some(context) = &self.context {
            config.context = Some(context.clone());
        }
        if let Some(persona) = &self.persona {
            config.persona = persona.clone();
        }
        if let Some(limits) = &self.limits {
            config.limits = limits.clone();
        }
        if let Some(topics) = &self.topics {
            config.topics = topics.clone();
        }
        if let Some(schema) = &self.schema {
            config.schema = schema.clone();
        }
        config
            .template_variables
            .extend(self.template_variables.clone());
    }
}

/// Result of applying a template: the instantiated config plus audit
/// facts about how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedTemplate {
    pub config: ConversationalFormConfig,
    pub template_id: String,
    /// True when any override customized the template's defaults.
    pub has_customizations: bool,
}
