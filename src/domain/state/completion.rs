//! Completion policy: when does the conversation stop asking questions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::model::{ConversationLimits, ConversationTopic, TopicPriority};

use super::conversation::ConversationState;

/// Why a conversation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// All required topics covered with sufficient confidence.
    Completed,
    /// Turn limit reached.
    TurnLimit,
    /// Wall-clock duration limit reached.
    DurationLimit,
    /// User confirmed submission before the engine decided.
    UserConfirmed,
}

impl CompletionReason {
    /// Wire label, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionReason::Completed => "completed",
            CompletionReason::TurnLimit => "turn_limit",
            CompletionReason::DurationLimit => "duration_limit",
            CompletionReason::UserConfirmed => "user_confirmed",
        }
    }
}

/// Result of a completion evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionCheck {
    pub should_complete: bool,
    pub reason: Option<CompletionReason>,
}

impl CompletionCheck {
    fn complete(reason: CompletionReason) -> Self {
        Self {
            should_complete: true,
            reason: Some(reason),
        }
    }

    fn not_yet() -> Self {
        Self {
            should_complete: false,
            reason: None,
        }
    }
}

/// Overall confidence derived from weighted topic coverage.
///
/// Required topics weigh more than important, important more than
/// optional; the result is monotonic in every topic's depth. A
/// conversation with no topics at all has nothing left to learn and
/// scores 1.0.
pub fn confidence(state: &ConversationState, topics: &[ConversationTopic]) -> f64 {
    let mut weighted_depth = 0.0;
    let mut total_weight = 0.0;

    for topic in topics {
        let weight = topic.priority.confidence_weight();
        let depth = state.coverage_for(&topic.id).map_or(0.0, |c| c.depth);
        weighted_depth += weight * depth;
        total_weight += weight;
    }

    if total_weight == 0.0 {
        1.0
    } else {
        weighted_depth / total_weight
    }
}

/// Decides whether the conversation should complete now.
///
/// Triggers, in priority order:
/// 1. all required topics covered and confidence at or above the
///    configured minimum;
/// 2. turn limit reached;
/// 3. duration limit reached.
///
/// Limit checks are never masked by incomplete coverage. `now` is
/// passed in so the policy stays a pure function.
pub fn evaluate(
    state: &ConversationState,
    limits: &ConversationLimits,
    topics: &[ConversationTopic],
    now: DateTime<Utc>,
) -> CompletionCheck {
    let required_covered = topics
        .iter()
        .filter(|t| t.priority == TopicPriority::Required)
        .all(|t| state.coverage_for(&t.id).is_some_and(|c| c.covered));

    if required_covered && confidence(state, topics) >= limits.min_confidence {
        return CompletionCheck::complete(CompletionReason::Completed);
    }

    if state.turn_count >= limits.max_turns {
        return CompletionCheck::complete(CompletionReason::TurnLimit);
    }

    let elapsed = now.signed_duration_since(state.started_at);
    if elapsed >= Duration::minutes(i64::from(limits.max_duration_minutes)) {
        return CompletionCheck::complete(CompletionReason::DurationLimit);
    }

    CompletionCheck::not_yet()
}
