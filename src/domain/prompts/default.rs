//! The generic, persona-driven prompt strategy.

use crate::domain::model::{ConversationTopic, ConversationalFormConfig, TopicPriority};
use crate::domain::state::{ConversationState, MessageRole};

use super::{NextTopicGuidance, PromptStrategy};

/// How many recent messages the conversation context quotes verbatim.
const CONTEXT_MESSAGE_WINDOW: usize = 10;

/// Fixed operating guidelines appended to every system prompt.
const OPERATING_GUIDELINES: &str = "\
Operating guidelines:
- Ask questions naturally, one at a time, as part of a flowing conversation.
- Probe required topics first; weave in important topics as openings arise.
- Never repeat a question the user has already answered.
- Before ending, summarize what you collected and ask the user to confirm.";

/// Generic strategy: renders prompts purely from the config's
/// objective, persona and topic list.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrategy;

impl DefaultStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl PromptStrategy for DefaultStrategy {
    fn build_system_prompt(&self, config: &ConversationalFormConfig) -> String {
        let mut prompt = format!("Objective: {}\n", config.objective);

        if let Some(context) = &config.context {
            prompt.push_str(&format!("Context: {}\n", context));
        }

        prompt.push_str("\nTopics to cover:\n");
        prompt.push_str(&render_topic_list(config));

        prompt.push_str("\nPersona:\n");
        prompt.push_str(&config.persona.render());
        prompt.push('\n');

        prompt.push('\n');
        prompt.push_str(OPERATING_GUIDELINES);
        prompt
    }

    fn build_conversation_context(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> String {
        render_conversation_context(state, config)
    }

    fn next_topic_guidance(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> NextTopicGuidance {
        pick_next_topic(state, config)
    }

    fn build_wrap_up_prompt(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> String {
        render_wrap_up(state, config)
    }

    fn build_extraction_guidance(
        &self,
        topic: &ConversationTopic,
        config: &ConversationalFormConfig,
    ) -> String {
        render_extraction_guidance(topic, config)
    }
}

/// Renders the configured topic list with priority, depth target and
/// description, one line per topic.
pub(crate) fn render_topic_list(config: &ConversationalFormConfig) -> String {
    let mut out = String::new();
    for topic in &config.topics {
        let priority = match topic.priority {
            TopicPriority::Required => "required",
            TopicPriority::Important => "important",
            TopicPriority::Optional => "optional",
        };
        out.push_str(&format!(
            "- {} ({}, {} depth)",
            topic.name,
            priority,
            topic.depth_target.label()
        ));
        if !topic.description.is_empty() {
            out.push_str(&format!(": {}", topic.description));
        }
        out.push('\n');
    }
    out
}

/// Shared conversation-context recap used by every strategy: the
/// context depends on runtime state, not on authored templates.
pub(crate) fn render_conversation_context(
    state: &ConversationState,
    config: &ConversationalFormConfig,
) -> String {
    let mut out = format!(
        "Conversation so far: {} user turn(s), confidence {:.0}%.\n",
        state.turn_count,
        state.confidence * 100.0
    );

    let start = state.messages.len().saturating_sub(CONTEXT_MESSAGE_WINDOW);
    if start < state.messages.len() {
        out.push_str("\nRecent messages:\n");
        for message in &state.messages[start..] {
            let role = match message.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            };
            out.push_str(&format!("[{}] {}\n", role, message.content));
        }
    }

    let covered: Vec<_> = config
        .topics
        .iter()
        .filter_map(|t| state.coverage_for(&t.id).filter(|c| c.covered).map(|c| (t, c)))
        .collect();
    if !covered.is_empty() {
        out.push_str("\nTopics already covered:\n");
        for (topic, coverage) in covered {
            out.push_str(&format!(
                "- {} (depth {:.0}%, {} mention(s))\n",
                topic.name,
                coverage.depth * 100.0,
                coverage.turn_count
            ));
        }
    }

    let remaining: Vec<_> = config
        .topics
        .iter()
        .filter(|t| {
            matches!(t.priority, TopicPriority::Required | TopicPriority::Important)
                && state.coverage_for(&t.id).is_some_and(|c| !c.covered)
        })
        .collect();
    if !remaining.is_empty() {
        out.push_str("\nStill to cover:\n");
        for topic in remaining {
            let priority = match topic.priority {
                TopicPriority::Required => "required",
                _ => "important",
            };
            if topic.description.is_empty() {
                out.push_str(&format!("- {} ({})\n", topic.name, priority));
            } else {
                out.push_str(&format!(
                    "- {} ({}): {}\n",
                    topic.name, priority, topic.description
                ));
            }
        }
    }

    out.push_str(
        "\nReference the user's earlier answers instead of asking again for anything above.",
    );
    out
}

/// First uncovered topic of the given priority, in config order.
fn first_uncovered<'a>(
    state: &ConversationState,
    config: &'a ConversationalFormConfig,
    priority: TopicPriority,
) -> Option<&'a ConversationTopic> {
    config.topics.iter().find(|t| {
        t.priority == priority && state.coverage_for(&t.id).is_some_and(|c| !c.covered)
    })
}

/// Selects the next topic to steer toward, or a wrap-up instruction when
/// nothing required or important remains.
pub(crate) fn pick_next_topic(
    state: &ConversationState,
    config: &ConversationalFormConfig,
) -> NextTopicGuidance {
    let next = first_uncovered(state, config, TopicPriority::Required)
        .or_else(|| first_uncovered(state, config, TopicPriority::Important));

    match next {
        Some(topic) => {
            let mut guidance = format!(
                "Steer the conversation toward \"{}\" ({} depth).",
                topic.name,
                topic.depth_target.label()
            );
            if !topic.description.is_empty() {
                guidance.push_str(&format!(" You need to learn: {}", topic.description));
            }
            NextTopicGuidance {
                topic: Some(topic.clone()),
                guidance,
            }
        }
        None => NextTopicGuidance {
            topic: None,
            guidance: "Every key topic is covered. Begin wrapping up the conversation."
                .to_string(),
        },
    }
}

/// Wrap-up instruction: keep gathering any uncovered required topics by
/// name, otherwise summarize, confirm and close.
pub(crate) fn render_wrap_up(
    state: &ConversationState,
    config: &ConversationalFormConfig,
) -> String {
    let uncovered: Vec<&str> = config
        .topics
        .iter()
        .filter(|t| {
            t.priority == TopicPriority::Required
                && state.coverage_for(&t.id).is_some_and(|c| !c.covered)
        })
        .map(|t| t.name.as_str())
        .collect();

    if !uncovered.is_empty() {
        return format!(
            "Before closing, you still need: {}. Ask about these directly but politely.",
            uncovered.join(", ")
        );
    }

    "Summarize everything the user told you, ask them to confirm it is correct, \
thank them, and let them know their request has been submitted."
        .to_string()
}

/// Guidance for extracting one topic's linked schema field.
pub(crate) fn render_extraction_guidance(
    topic: &ConversationTopic,
    config: &ConversationalFormConfig,
) -> String {
    let field = config
        .schema
        .field_for_topic(&topic.id, topic.extraction_field.as_deref());

    match field {
        Some(field) => {
            let mut out = format!(
                "Extract \"{}\" ({}{})",
                field.name,
                field.field_type.label(),
                if field.required { ", required" } else { "" }
            );
            if let Some(options) = field.options() {
                out.push_str(&format!("; one of: {}", options.join(", ")));
            }
            if !field.description.is_empty() {
                out.push_str(&format!(". {}", field.description));
            }
            out
        }
        None => format!("Extract information about {}.", topic.name),
    }
}
