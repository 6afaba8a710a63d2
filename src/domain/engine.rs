//! The conversation engine: the in-memory state machine driving one
//! conversational form session.

use chrono::Utc;
use tracing::debug;

use crate::domain::foundation::FormId;
use crate::domain::model::{ConversationalFormConfig, TopicPriority};
use crate::domain::prompts::{DefaultStrategy, HelpdeskStrategy, PromptStrategy};
use crate::domain::state::{
    confidence, evaluate, CompletionReason, ConversationState, CoverageAnalyzer,
    KeywordCoverageAnalyzer, Message, MessageRole,
};
use crate::domain::templates::TemplateRegistry;

/// What one user turn produced: the updated transcript and state, the
/// guidance for the next assistant reply, and the completion signal.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub messages: Vec<Message>,
    pub state: ConversationState,
    /// Conversation context plus exactly one of next-topic or wrap-up
    /// guidance, ready to prepend to the LLM request.
    pub guidance: String,
    pub should_complete: bool,
}

/// Aggregate coverage counts for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageSummary {
    pub total: usize,
    pub covered: usize,
    pub required: usize,
    pub required_covered: usize,
    pub important: usize,
    pub important_covered: usize,
}

/// Drives one conversation: owns the config, the resolved prompt
/// strategy, the coverage analyzer, the state and the raw transcript.
///
/// The engine does no I/O. Callers persist `state()` between turns and
/// rehydrate with [`set_state`](Self::set_state); the transport layer
/// sends `messages()` to the LLM and feeds replies back through
/// [`add_assistant_response`](Self::add_assistant_response).
pub struct ConversationEngine {
    config: ConversationalFormConfig,
    strategy: Box<dyn PromptStrategy>,
    analyzer: Box<dyn CoverageAnalyzer>,
    state: ConversationState,
    messages: Vec<Message>,
    initialized: bool,
}

impl ConversationEngine {
    /// Creates an engine for a fresh conversation. The prompt strategy
    /// is resolved later, in [`initialize`](Self::initialize).
    pub fn new(form_id: FormId, config: ConversationalFormConfig) -> Self {
        let state = ConversationState::new(form_id, &config);
        Self {
            config,
            strategy: Box::new(DefaultStrategy::new()),
            analyzer: Box::new(KeywordCoverageAnalyzer::default()),
            state,
            messages: Vec::new(),
            initialized: false,
        }
    }

    /// Replaces the coverage analyzer, e.g. with an LLM-assisted scorer.
    pub fn with_analyzer(mut self, analyzer: Box<dyn CoverageAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Resolves the prompt strategy and seeds the system message.
    ///
    /// Idempotent: calling again re-resolves the strategy and refreshes
    /// the system message in place without touching loaded history.
    ///
    /// Resolution precedence: `config.template_id` (an id the registry
    /// does not know degrades to the generic strategy), then the legacy
    /// `it_helpdesk_mode` flag, then the generic strategy.
    pub fn initialize(&mut self, registry: &TemplateRegistry) {
        self.strategy = self.resolve_strategy(registry);
        let system_prompt = self.strategy.build_system_prompt(&self.config);

        self.refresh_system_message(system_prompt);
        self.initialized = true;
    }

    fn resolve_strategy(&self, registry: &TemplateRegistry) -> Box<dyn PromptStrategy> {
        if let Some(template_id) = &self.config.template_id {
            match registry.get(template_id) {
                Some(template) => return template.strategy.instantiate(),
                None => {
                    debug!(
                        template_id = %template_id,
                        "configured template not in registry, using generic strategy"
                    );
                }
            }
        } else if self.config.it_helpdesk_mode {
            return Box::new(HelpdeskStrategy::new());
        }
        Box::new(DefaultStrategy::new())
    }

    fn refresh_system_message(&mut self, system_prompt: String) {
        let message = Message::new(MessageRole::System, system_prompt);

        match self.messages.first_mut() {
            Some(first) if first.role == MessageRole::System => *first = message.clone(),
            _ => self.messages.insert(0, message.clone()),
        }
        match self.state.messages.first_mut() {
            Some(first) if first.role == MessageRole::System => *first = message,
            _ => self.state.messages.insert(0, message),
        }
    }

    /// Ingests one user message: updates coverage and confidence, checks
    /// completion, and produces the guidance for the next reply.
    pub fn process_user_message(&mut self, text: impl Into<String>) -> TurnOutcome {
        let text = text.into();
        self.state.add_message(MessageRole::User, text.clone());
        self.messages.push(Message::new(MessageRole::User, text.clone()));

        self.analyzer
            .analyze(&self.config.topics, &text, &mut self.state.topic_coverage);
        self.state.confidence = confidence(&self.state, &self.config.topics);

        let check = evaluate(
            &self.state,
            &self.config.limits,
            &self.config.topics,
            Utc::now(),
        );
        if check.should_complete {
            if let Some(reason) = check.reason {
                self.state.complete(reason);
            }
        }

        let mut guidance = self
            .strategy
            .build_conversation_context(&self.state, &self.config);
        guidance.push_str("\n\n");
        if check.should_complete {
            guidance.push_str(&self.strategy.build_wrap_up_prompt(&self.state, &self.config));
        } else {
            guidance.push_str(
                &self
                    .strategy
                    .next_topic_guidance(&self.state, &self.config)
                    .guidance,
            );
        }

        TurnOutcome {
            messages: self.messages.clone(),
            state: self.state.clone(),
            guidance,
            should_complete: check.should_complete,
        }
    }

    /// Records the assistant's reply in the transcript and state.
    pub fn add_assistant_response(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.state.add_message(MessageRole::Assistant, text.clone());
        self.messages.push(Message::new(MessageRole::Assistant, text));
    }

    /// Rehydrates a persisted conversation. The raw transcript is
    /// rebuilt from the state's own message history.
    pub fn set_state(&mut self, state: ConversationState) {
        self.messages = state.messages.clone();
        self.state = state;
    }

    /// Replaces the raw transcript, e.g. when the caller truncates it
    /// for context-window reasons. State history is untouched.
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn config(&self) -> &ConversationalFormConfig {
        &self.config
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_complete(&self) -> bool {
        !self.state.is_active()
    }

    pub fn completion_reason(&self) -> Option<CompletionReason> {
        self.state.completion_reason
    }

    /// Names of required topics not yet covered.
    pub fn uncovered_required_topics(&self) -> Vec<&str> {
        self.config
            .topics
            .iter()
            .filter(|t| {
                t.priority == TopicPriority::Required
                    && self.state.coverage_for(&t.id).is_some_and(|c| !c.covered)
            })
            .map(|t| t.name.as_str())
            .collect()
    }

    pub fn coverage_summary(&self) -> CoverageSummary {
        let mut summary = CoverageSummary {
            total: self.config.topics.len(),
            covered: 0,
            required: 0,
            required_covered: 0,
            important: 0,
            important_covered: 0,
        };

        for topic in &self.config.topics {
            let covered = self
                .state
                .coverage_for(&topic.id)
                .is_some_and(|c| c.covered);
            if covered {
                summary.covered += 1;
            }
            match topic.priority {
                TopicPriority::Required => {
                    summary.required += 1;
                    if covered {
                        summary.required_covered += 1;
                    }
                }
                TopicPriority::Important => {
                    summary.important += 1;
                    if covered {
                        summary.important_covered += 1;
                    }
                }
                TopicPriority::Optional => {}
            }
        }

        summary
    }
}
