//! Limits governing forced conversation completion.

use serde::{Deserialize, Serialize};

/// Thresholds that bound a conversation regardless of topic coverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversationLimits {
    /// Maximum user turns before forced completion.
    pub max_turns: u32,
    /// Maximum elapsed wall-clock minutes before forced completion.
    pub max_duration_minutes: u32,
    /// Confidence required for natural completion, in [0, 1].
    pub min_confidence: f64,
}

impl ConversationLimits {
    pub fn new(max_turns: u32, max_duration_minutes: u32, min_confidence: f64) -> Self {
        Self {
            max_turns,
            max_duration_minutes,
            min_confidence,
        }
    }

    /// Validates the limits, returning human-readable authoring errors.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_turns == 0 {
            errors.push("max_turns must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            errors.push(format!(
                "min_confidence must be between 0 and 1, got {}",
                self.min_confidence
            ));
        }
        errors
    }
}

impl Default for ConversationLimits {
    fn default() -> Self {
        Self {
            max_turns: 12,
            max_duration_minutes: 30,
            min_confidence: 0.7,
        }
    }
}
