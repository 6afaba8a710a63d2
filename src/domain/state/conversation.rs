//! The central runtime aggregate for one conversation session.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{ConversationId, FormId};
use crate::domain::model::{ConversationalFormConfig, TopicCoverage};

use super::completion::CompletionReason;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Accepts both RFC 3339 strings and epoch milliseconds on load,
    /// so drafts persisted by older transports still rehydrate.
    #[serde(deserialize_with = "flexible_timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Lifecycle status of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    #[default]
    Active,
    /// Terminal: no further transitions.
    Completed,
}

/// Complete runtime state of one conversation session.
///
/// Created once per session; every turn updates it through the methods
/// below. Persisted as a draft document until completion, after which
/// the transport layer finalizes it into a submission record. Must
/// round-trip through storage bit-for-bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub conversation_id: ConversationId,
    pub form_id: FormId,
    pub messages: Vec<Message>,
    pub topic_coverage: Vec<TopicCoverage>,
    /// Best-guess extracted value per schema field so far.
    #[serde(default)]
    pub partial_extractions: HashMap<String, serde_json::Value>,
    /// Weighted topic-coverage confidence, in [0, 1].
    pub confidence: f64,
    /// Number of user turns so far.
    pub turn_count: u32,
    pub max_turns: u32,
    pub status: ConversationStatus,
    /// Why the conversation completed, recorded at the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_reason: Option<CompletionReason>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ConversationState {
    /// Initializes state for a new conversation: empty history, zeroed
    /// coverage per configured topic, status active.
    pub fn new(form_id: FormId, config: &ConversationalFormConfig) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: ConversationId::new(),
            form_id,
            messages: Vec::new(),
            topic_coverage: config
                .topics
                .iter()
                .map(|t| TopicCoverage::new(t.id.clone()))
                .collect(),
            partial_extractions: HashMap::new(),
            confidence: 0.0,
            turn_count: 0,
            max_turns: config.limits.max_turns,
            status: ConversationStatus::Active,
            completion_reason: None,
            started_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Appends a message, incrementing the turn count only for user
    /// messages.
    pub fn add_message(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
        if role == MessageRole::User {
            self.turn_count += 1;
        }
        self.updated_at = Utc::now();
    }

    /// Records or replaces a partial extraction for a schema field.
    pub fn record_extraction(&mut self, field: impl Into<String>, value: serde_json::Value) {
        self.partial_extractions.insert(field.into(), value);
        self.updated_at = Utc::now();
    }

    /// Merges an object of extractions keyed by field name. Non-object
    /// values are ignored.
    pub fn merge_extractions(&mut self, extracted: serde_json::Value) {
        if let serde_json::Value::Object(map) = extracted {
            for (field, value) in map {
                self.partial_extractions.insert(field, value);
            }
            self.updated_at = Utc::now();
        }
    }

    /// Marks the conversation completed with the given reason. No-op if
    /// already completed: the first recorded reason wins.
    pub fn complete(&mut self, reason: CompletionReason) {
        if self.status == ConversationStatus::Completed {
            return;
        }
        let now = Utc::now();
        self.status = ConversationStatus::Completed;
        self.completion_reason = Some(reason);
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Coverage record for a topic.
    pub fn coverage_for(&self, topic_id: &str) -> Option<&TopicCoverage> {
        self.topic_coverage.iter().find(|c| c.topic_id == topic_id)
    }

    pub fn is_active(&self) -> bool {
        self.status == ConversationStatus::Active
    }
}

/// Deserializes a `DateTime<Utc>` from either an RFC 3339 string or
/// epoch milliseconds.
mod flexible_timestamp {
    use super::*;
    use serde::de::{self, Deserializer};

    struct TimestampVisitor;

    impl<'de> de::Visitor<'de> for TimestampVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("an RFC 3339 timestamp string or epoch milliseconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            DateTime::parse_from_rfc3339(v)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Utc.timestamp_millis_opt(v)
                .single()
                .ok_or_else(|| E::custom(format!("epoch milliseconds out of range: {}", v)))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            self.visit_i64(v as i64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            self.visit_i64(v as i64)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        d.deserialize_any(TimestampVisitor)
    }
}
