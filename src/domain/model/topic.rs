//! Conversation topics and runtime coverage tracking.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How strongly a topic must be addressed before the conversation
/// can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicPriority {
    /// Must be covered before natural completion.
    Required,
    /// Should be covered; probed after required topics.
    Important,
    /// Covered opportunistically.
    Optional,
}

impl TopicPriority {
    /// Weight used when aggregating topic depth into overall confidence.
    pub fn confidence_weight(&self) -> f64 {
        match self {
            TopicPriority::Required => 3.0,
            TopicPriority::Important => 2.0,
            TopicPriority::Optional => 1.0,
        }
    }
}

/// How thoroughly a topic must be discussed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthTarget {
    /// A single clear mention satisfies the topic.
    Surface,
    /// The topic needs some elaboration.
    Moderate,
    /// The topic needs thorough discussion.
    Deep,
}

impl DepthTarget {
    /// Depth at which a topic with this target counts as covered.
    pub fn coverage_threshold(&self) -> f64 {
        match self {
            DepthTarget::Surface => 0.3,
            DepthTarget::Moderate => 0.6,
            DepthTarget::Deep => 0.85,
        }
    }

    /// Human-readable label used in prompt text.
    pub fn label(&self) -> &'static str {
        match self {
            DepthTarget::Surface => "surface",
            DepthTarget::Moderate => "moderate",
            DepthTarget::Deep => "deep",
        }
    }
}

/// A named informational goal the conversation must (or should) address.
///
/// Immutable once a template or config is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTopic {
    /// Unique id within a topic list.
    pub id: String,
    /// Display name, also used for keyword matching.
    pub name: String,
    /// What information this topic is meant to surface.
    #[serde(default)]
    pub description: String,
    pub priority: TopicPriority,
    pub depth_target: DepthTarget,
    /// Name of the extraction schema field this topic feeds, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_field: Option<String>,
    /// Authored hint terms for the heuristic coverage analyzer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl ConversationTopic {
    /// Creates a required, surface-depth topic. Use the `with_` methods
    /// to adjust.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            priority: TopicPriority::Required,
            depth_target: DepthTarget::Surface,
            extraction_field: None,
            keywords: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: TopicPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_depth_target(mut self, depth_target: DepthTarget) -> Self {
        self.depth_target = depth_target;
        self
    }

    pub fn with_extraction_field(mut self, field: impl Into<String>) -> Self {
        self.extraction_field = Some(field.into());
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }
}

/// Running estimate of how thoroughly one topic has been discussed.
///
/// Created at conversation start from the topic list; mutated after each
/// user turn by the coverage analyzer; never deleted, only updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCoverage {
    pub topic_id: String,
    pub covered: bool,
    /// 0.0 (untouched) to 1.0 (fully satisfied). Non-decreasing within
    /// one conversation.
    pub depth: f64,
    /// How many user turns touched this topic.
    pub turn_count: u32,
}

impl TopicCoverage {
    /// Creates zeroed coverage for a topic.
    pub fn new(topic_id: impl Into<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
            covered: false,
            depth: 0.0,
            turn_count: 0,
        }
    }
}

/// Validates a topic list, returning human-readable authoring errors.
///
/// Never fails hard: callers decide whether to block a save.
pub fn validate_topics(topics: &[ConversationTopic]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for topic in topics {
        if topic.id.trim().is_empty() {
            errors.push(format!("topic '{}' has an empty id", topic.name));
        } else if !seen.insert(topic.id.as_str()) {
            errors.push(format!("duplicate topic id '{}'", topic.id));
        }
        if topic.name.trim().is_empty() {
            errors.push(format!("topic '{}' has an empty name", topic.id));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    mod priority {
        use super::*;

        #[test]
        fn required_weighs_more_than_optional() {
            assert!(
                TopicPriority::Required.confidence_weight()
                    > TopicPriority::Optional.confidence_weight()
            );
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&TopicPriority::Required).unwrap();
            assert_eq!(json, "\"required\"");
        }
    }

    mod depth_target {
        use super::*;

        #[test]
        fn thresholds_are_ordered() {
            assert!(
                DepthTarget::Surface.coverage_threshold()
                    < DepthTarget::Moderate.coverage_threshold()
            );
            assert!(
                DepthTarget::Moderate.coverage_threshold()
                    < DepthTarget::Deep.coverage_threshold()
            );
        }

        #[test]
        fn thresholds_are_within_unit_interval() {
            for target in [DepthTarget::Surface, DepthTarget::Moderate, DepthTarget::Deep] {
                let t = target.coverage_threshold();
                assert!(t > 0.0 && t < 1.0);
            }
        }
    }

    mod topic_builder {
        use super::*;

        #[test]
        fn new_topic_defaults_to_required_surface() {
            let topic = ConversationTopic::new("cat", "Category");
            assert_eq!(topic.priority, TopicPriority::Required);
            assert_eq!(topic.depth_target, DepthTarget::Surface);
            assert!(topic.extraction_field.is_none());
        }

        #[test]
        fn builder_methods_set_fields() {
            let topic = ConversationTopic::new("urgency", "Urgency")
                .with_description("How quickly this needs attention")
                .with_priority(TopicPriority::Important)
                .with_depth_target(DepthTarget::Moderate)
                .with_extraction_field("urgency")
                .with_keywords(vec!["urgent".to_string(), "asap".to_string()]);

            assert_eq!(topic.priority, TopicPriority::Important);
            assert_eq!(topic.depth_target, DepthTarget::Moderate);
            assert_eq!(topic.extraction_field.as_deref(), Some("urgency"));
            assert_eq!(topic.keywords.len(), 2);
        }
    }

    mod coverage {
        use super::*;

        #[test]
        fn new_coverage_is_zeroed() {
            let coverage = TopicCoverage::new("cat");
            assert!(!coverage.covered);
            assert_eq!(coverage.depth, 0.0);
            assert_eq!(coverage.turn_count, 0);
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn accepts_unique_topics() {
            let topics = vec![
                ConversationTopic::new("a", "A"),
                ConversationTopic::new("b", "B"),
            ];
            assert!(validate_topics(&topics).is_empty());
        }

        #[test]
        fn rejects_duplicate_ids() {
            let topics = vec![
                ConversationTopic::new("a", "First"),
                ConversationTopic::new("a", "Second"),
            ];
            let errors = validate_topics(&topics);
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("duplicate topic id 'a'"));
        }

        #[test]
        fn rejects_empty_id() {
            let topics = vec![ConversationTopic::new("", "Unnamed")];
            let errors = validate_topics(&topics);
            assert!(errors[0].contains("empty id"));
        }

        #[test]
        fn rejects_empty_name() {
            let topics = vec![ConversationTopic::new("a", "")];
            let errors = validate_topics(&topics);
            assert!(errors.iter().any(|e| e.contains("empty name")));
        }
    }
}
