//! Prompt strategy driven by authored templates with `{{variable}}`
//! placeholders.

use std::collections::HashMap;

use crate::domain::model::{ConversationTopic, ConversationalFormConfig};
use crate::domain::state::ConversationState;

use super::default::DefaultStrategy;
use super::interpolate::interpolate;
use super::{NextTopicGuidance, PromptStrategy};

/// Strategy whose system and wrap-up prompts are authored text with
/// placeholders, filled from the config at render time.
///
/// Built-in variables `objective`, `context`, `persona` and `topics` are
/// always available; `config.template_variables` adds caller-defined ones
/// and may shadow the built-ins. Prompts without an authored template fall
/// back to [`DefaultStrategy`], which also supplies all runtime prompts.
#[derive(Debug, Clone, Default)]
pub struct TemplatedStrategy {
    system_prompt: Option<String>,
    wrap_up_prompt: Option<String>,
    inner: DefaultStrategy,
}

impl TemplatedStrategy {
    pub fn new(system_prompt: Option<String>, wrap_up_prompt: Option<String>) -> Self {
        Self {
            system_prompt,
            wrap_up_prompt,
            inner: DefaultStrategy::new(),
        }
    }

    fn variables(config: &ConversationalFormConfig) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("objective".to_string(), config.objective.clone());
        vars.insert(
            "context".to_string(),
            config.context.clone().unwrap_or_default(),
        );
        vars.insert("persona".to_string(), config.persona.render());
        vars.insert(
            "topics".to_string(),
            super::default::render_topic_list(config),
        );
        for (name, value) in &config.template_variables {
            vars.insert(name.clone(), value.clone());
        }
        vars
    }
}

impl PromptStrategy for TemplatedStrategy {
    fn build_system_prompt(&self, config: &ConversationalFormConfig) -> String {
        match &self.system_prompt {
            Some(template) => interpolate(template, &Self::variables(config)),
            None => self.inner.build_system_prompt(config),
        }
    }

    fn build_conversation_context(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> String {
        self.inner.build_conversation_context(state, config)
    }

    fn next_topic_guidance(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> NextTopicGuidance {
        self.inner.next_topic_guidance(state, config)
    }

    fn build_wrap_up_prompt(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> String {
        match &self.wrap_up_prompt {
            Some(template) => interpolate(template, &Self::variables(config)),
            None => self.inner.build_wrap_up_prompt(state, config),
        }
    }

    fn build_extraction_guidance(
        &self,
        topic: &ConversationTopic,
        config: &ConversationalFormConfig,
    ) -> String {
        self.inner.build_extraction_guidance(topic, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::FormId;

    fn config() -> ConversationalFormConfig {
        let mut config = ConversationalFormConfig::new("Gather product feedback")
            .with_context("Quarterly survey")
            .with_topics(vec![ConversationTopic::new("sat", "Satisfaction")]);
        config
            .template_variables
            .insert("product".to_string(), "Widget Pro".to_string());
        config
    }

    #[test]
    fn system_prompt_interpolates_built_in_variables() {
        let strategy = TemplatedStrategy::new(
            Some("Goal: {{objective}}. Setting: {{context}}.\n{{topics}}".to_string()),
            None,
        );
        let prompt = strategy.build_system_prompt(&config());

        assert!(prompt.contains("Goal: Gather product feedback."));
        assert!(prompt.contains("Setting: Quarterly survey."));
        assert!(prompt.contains("- Satisfaction (required"));
    }

    #[test]
    fn system_prompt_interpolates_caller_variables() {
        let strategy =
            TemplatedStrategy::new(Some("Ask about {{product}}.".to_string()), None);
        assert_eq!(
            strategy.build_system_prompt(&config()),
            "Ask about Widget Pro."
        );
    }

    #[test]
    fn caller_variables_shadow_built_ins() {
        let mut cfg = config();
        cfg.template_variables
            .insert("objective".to_string(), "overridden".to_string());
        let strategy = TemplatedStrategy::new(Some("{{objective}}".to_string()), None);
        assert_eq!(strategy.build_system_prompt(&cfg), "overridden");
    }

    #[test]
    fn unknown_placeholders_are_left_verbatim() {
        let strategy = TemplatedStrategy::new(Some("Hello {{nobody}}".to_string()), None);
        assert_eq!(strategy.build_system_prompt(&config()), "Hello {{nobody}}");
    }

    #[test]
    fn missing_system_template_falls_back_to_generic_prompt() {
        let strategy = TemplatedStrategy::new(None, Some("Bye.".to_string()));
        let prompt = strategy.build_system_prompt(&config());
        assert!(prompt.contains("Objective: Gather product feedback"));
    }

    #[test]
    fn wrap_up_template_is_interpolated() {
        let cfg = config();
        let state = ConversationState::new(FormId::new(), &cfg);
        let strategy = TemplatedStrategy::new(
            None,
            Some("Thanks for the feedback on {{product}}!".to_string()),
        );
        assert_eq!(
            strategy.build_wrap_up_prompt(&state, &cfg),
            "Thanks for the feedback on Widget Pro!"
        );
    }

    #[test]
    fn runtime_prompts_always_come_from_the_generic_strategy() {
        let cfg = config();
        let state = ConversationState::new(FormId::new(), &cfg);
        let strategy = TemplatedStrategy::new(Some("custom".to_string()), None);

        let templated = strategy.build_conversation_context(&state, &cfg);
        let generic = DefaultStrategy::new().build_conversation_context(&state, &cfg);
        assert_eq!(templated, generic);
    }
}
