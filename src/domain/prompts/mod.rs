//! Prompt strategies.
//!
//! A prompt strategy turns (config, state) into the natural-language
//! instructions the transport layer forwards to the LLM. All operations
//! are pure functions with no side effects; strategies differ only in
//! phrasing and structure.

mod default;
mod helpdesk;
mod interpolate;
mod templated;

pub use default::DefaultStrategy;
pub use helpdesk::HelpdeskStrategy;
pub use interpolate::interpolate;
pub use templated::TemplatedStrategy;

use crate::domain::model::{ConversationTopic, ConversationalFormConfig};
use crate::domain::state::ConversationState;

/// The next topic the assistant should steer toward, with guidance text.
#[derive(Debug, Clone)]
pub struct NextTopicGuidance {
    /// `None` once every required and important topic is covered; the
    /// guidance is then a wrap-up instruction.
    pub topic: Option<ConversationTopic>,
    pub guidance: String,
}

/// Policy object that renders conversation state into LLM instructions.
pub trait PromptStrategy: Send + Sync {
    /// Renders the full system prompt: objective, context, topic list,
    /// persona section and fixed operating guidelines.
    fn build_system_prompt(&self, config: &ConversationalFormConfig) -> String;

    /// Renders a recap of the live conversation: turn count, confidence,
    /// recent messages, covered and outstanding topics, and an explicit
    /// instruction to reference prior answers rather than re-asking.
    fn build_conversation_context(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> String;

    /// Picks the single next topic to steer toward: first uncovered
    /// required topic, else first uncovered important topic, else a
    /// wrap-up instruction.
    fn next_topic_guidance(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> NextTopicGuidance;

    /// Renders the wrap-up instruction: keep gathering any uncovered
    /// required topics by name, or summarize, confirm and close.
    fn build_wrap_up_prompt(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> String;

    /// Renders guidance for extracting one topic's schema field, falling
    /// back to a generic instruction when no field matches.
    fn build_extraction_guidance(
        &self,
        topic: &ConversationTopic,
        config: &ConversationalFormConfig,
    ) -> String;
}
