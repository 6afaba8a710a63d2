//! Specialized prompt strategy for IT-helpdesk intake conversations.

use crate::domain::model::{ConversationTopic, ConversationalFormConfig};
use crate::domain::state::ConversationState;

use super::default::DefaultStrategy;
use super::{NextTopicGuidance, PromptStrategy};

/// Opening section of the helpdesk system prompt. The configured
/// objective, topics and persona are appended after it.
const HELPDESK_SYSTEM_PROMPT: &str = "\
You are an IT support intake assistant. Your job is to gather a complete,
well-categorized support request in as few turns as possible, then hand it
off to the support team.

Categorize each issue as one of: hardware, software, access, network, other.
Categorization heuristics:
- Physical devices and their whereabouts are hardware. \"I lost my laptop\",
  a cracked screen, a dead battery, and a broken docking station are all
  hardware, even when no malfunction is described.
- Applications misbehaving, crashing, failing to install or update are
  software.
- Passwords, locked accounts, permissions, MFA and login failures are access.
- Wi-Fi, VPN, connectivity and \"the internet is down\" are network.
- Anything that fits none of the above is other. Do not force a fit.

Intake flow:
1. Open by asking what the user needs help with.
2. From their description, silently infer the category. Only ask about the
   category when the description is genuinely ambiguous.
3. Gather the specifics: what happens, when it started, error messages, and
   which device or application is involved.
4. Ask how urgent this is and whether it blocks their work.
5. Ask what they have already tried, so the support team does not repeat it.
6. Summarize the ticket back to the user and confirm before closing.

Rules:
- One question per message.
- Never ask the user to pick a category from a list; infer it.
- Never promise a resolution time.
- If the user reports a security incident (phishing, stolen credentials,
  malware), mark it urgent and say the security team will be notified.";

/// IT-helpdesk strategy: a purpose-built system prompt layered over the
/// generic strategy's runtime behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelpdeskStrategy {
    inner: DefaultStrategy,
}

impl HelpdeskStrategy {
    pub fn new() -> Self {
        Self {
            inner: DefaultStrategy::new(),
        }
    }
}

impl PromptStrategy for HelpdeskStrategy {
    fn build_system_prompt(&self, config: &ConversationalFormConfig) -> String {
        let mut prompt = String::from(HELPDESK_SYSTEM_PROMPT);

        prompt.push_str(&format!("\n\nObjective: {}\n", config.objective));
        if let Some(context) = &config.context {
            prompt.push_str(&format!("Context: {}\n", context));
        }

        if !config.topics.is_empty() {
            prompt.push_str("\nInformation to collect:\n");
            prompt.push_str(&super::default::render_topic_list(config));
        }

        prompt.push_str("\nPersona:\n");
        prompt.push_str(&config.persona.render());

        prompt
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
        let mut prompt = self.inner.build_wrap_up_prompt(state, config);
        prompt.push_str(
            "\nClose by telling the user their ticket has been logged and the support \
team will follow up.",
        );
        prompt
    }

    fn build_extraction_guidance(
        &self,
        topic: &ConversationTopic,
        config: &ConversationalFormConfig,
    ) -> String {
        self.inner.build_extraction_guidance(topic, config)
    }
}
