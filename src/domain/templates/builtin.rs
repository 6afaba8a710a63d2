//! Built-in conversation templates shipped with the crate.

use once_cell::sync::Lazy;

use crate::domain::model::{
    ConversationPersona, ConversationTopic, DepthTarget, ExtractionField, ExtractionSchema,
    FieldType, PersonaStyle, TopicPriority,
};

use super::registry::StoredTemplate;
use super::template::{ConversationTemplate, StrategyKind, TemplateCategory, TemplateMetadata};

static BUILT_INS: Lazy<Vec<StoredTemplate>> = Lazy::new(|| {
    vec![
        StoredTemplate {
            template: it_helpdesk(),
            priority: 100,
            enabled: true,
        },
        StoredTemplate {
            template: general_intake(),
            priority: 90,
            enabled: true,
        },
        StoredTemplate {
            template: customer_feedback(),
            priority: 80,
            enabled: true,
        },
    ]
});

/// The built-in templates, in seeding order.
pub fn built_in_templates() -> &'static [StoredTemplate] {
    &BUILT_INS
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn it_helpdesk() -> ConversationTemplate {
    ConversationTemplate::new(
        "it-helpdesk",
        "IT Helpdesk",
        TemplateCategory::Support,
        "Collect a complete, well-categorized IT support request",
    )
    .with_description("Intake flow for internal IT support tickets")
    .with_persona(
        ConversationPersona::new(PersonaStyle::Professional)
            .with_tone("calm and efficient")
            .with_restrictions(strings(&["Promise a resolution time"])),
    )
    .with_topics(vec![
        ConversationTopic::new("issue-category", "Issue Category")
            .with_description("Whether this is a hardware, software, access, or network issue")
            .with_extraction_field("category")
            .with_keywords(strings(&[
                "laptop", "computer", "screen", "keyboard", "printer", "hardware", "software",
                "application", "install", "update", "password", "login", "account", "access",
                "wifi", "network", "vpn", "internet",
            ])),
        ConversationTopic::new("issue-details", "Issue Details")
            .with_description("What happens, when it started, and any error messages")
            .with_depth_target(DepthTarget::Moderate)
            .with_extraction_field("description")
            .with_keywords(strings(&[
                "error", "message", "crash", "broken", "started", "happens", "fails", "stopped",
            ])),
        ConversationTopic::new("urgency", "Urgency")
            .with_description("How urgent this is and whether it blocks the user's work")
            .with_priority(TopicPriority::Important)
            .with_extraction_field("urgency")
            .with_keywords(strings(&[
                "urgent", "blocking", "blocked", "asap", "deadline", "today", "whenever",
            ])),
        ConversationTopic::new("attempted-fixes", "Attempted Fixes")
            .with_description("What the user has already tried")
            .with_priority(TopicPriority::Optional)
            .with_extraction_field("attempted_fixes")
            .with_keywords(strings(&[
                "tried", "restarted", "rebooted", "reinstalled", "already",
            ])),
    ])
    .with_schema(ExtractionSchema::new(vec![
        ExtractionField::new("category", FieldType::Enum)
            .required()
            .with_description("Broad category of the issue")
            .with_options(strings(&["hardware", "software", "access", "network", "other"]))
            .with_topic("issue-category"),
        ExtractionField::new("description", FieldType::String)
            .required()
            .with_description("Full description of the issue in the user's words")
            .with_topic("issue-details"),
        ExtractionField::new("urgency", FieldType::String)
            .with_description("How urgent the issue is")
            .with_topic("urgency"),
        ExtractionField::new("attempted_fixes", FieldType::String)
            .with_description("What the user already tried")
            .with_topic("attempted-fixes"),
    ]))
    .with_strategy(StrategyKind::Helpdesk)
    .with_metadata(TemplateMetadata {
        tags: strings(&["it", "support", "ticket"]),
        estimated_minutes: Some(5),
    })
}

fn general_intake() -> ConversationTemplate {
    ConversationTemplate::new(
        "general-intake",
        "General Intake",
        TemplateCategory::Intake,
        "Understand what the user needs and capture their request",
    )
    .with_description("Open-ended request intake for any team")
    .with_topics(vec![
        ConversationTopic::new("request", "Request")
            .with_description("What the user is asking for")
            .with_depth_target(DepthTarget::Moderate)
            .with_extraction_field("request")
            .with_keywords(strings(&["need", "want", "request", "help", "looking"])),
        ConversationTopic::new("timeline", "Timeline")
            .with_description("When they need it by")
            .with_priority(TopicPriority::Important)
            .with_extraction_field("timeline")
            .with_keywords(strings(&["when", "deadline", "date", "week", "month", "asap"])),
    ])
    .with_schema(ExtractionSchema::new(vec![
        ExtractionField::new("request", FieldType::String)
            .required()
            .with_description("The request in the user's words")
            .with_topic("request"),
        ExtractionField::new("timeline", FieldType::String)
            .with_description("When the request is needed")
            .with_topic("timeline"),
    ]))
    .with_metadata(TemplateMetadata {
        tags: strings(&["intake"]),
        estimated_minutes: Some(3),
    })
}

fn customer_feedback() -> ConversationTemplate {
    ConversationTemplate::new(
        "customer-feedback",
        "Customer Feedback",
        TemplateCategory::Feedback,
        "Gather candid feedback about the user's experience",
    )
    .with_description("Conversational replacement for a satisfaction survey")
    .with_persona(ConversationPersona::new(PersonaStyle::Friendly))
    .with_topics(vec![
        ConversationTopic::new("satisfaction", "Overall Satisfaction")
            .with_description("How satisfied the user is and why")
            .with_depth_target(DepthTarget::Moderate)
            .with_extraction_field("satisfaction")
            .with_keywords(strings(&[
                "satisfied", "happy", "unhappy", "disappointed", "love", "hate", "great",
            ])),
        ConversationTopic::new("improvements", "Improvements")
            .with_description("What the user would change")
            .with_priority(TopicPriority::Important)
            .with_extraction_field("improvements")
            .with_keywords(strings(&["improve", "change", "wish", "better", "missing"])),
    ])
    .with_schema(ExtractionSchema::new(vec![
        ExtractionField::new("satisfaction", FieldType::String)
            .required()
            .with_description("Overall satisfaction and the reasons for it")
            .with_topic("satisfaction"),
        ExtractionField::new("improvements", FieldType::String)
            .with_description("Suggested improvements")
            .with_topic("improvements"),
    ]))
    .with_metadata(TemplateMetadata {
        tags: strings(&["feedback", "survey"]),
        estimated_minutes: Some(4),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::validate_schema;

    #[test]
    fn every_built_in_config_validates() {
        for stored in built_in_templates() {
            let config = stored.template.to_config();
            let errors = config.validate();
            assert!(
                errors.is_empty(),
                "built-in '{}' has authoring errors: {:?}",
                stored.template.id,
                errors
            );
        }
    }

    #[test]
    fn every_built_in_topic_feeds_a_schema_field() {
        for stored in built_in_templates() {
            let template = &stored.template;
            for topic in &template.topics {
                assert!(
                    template
                        .schema
                        .field_for_topic(&topic.id, topic.extraction_field.as_deref())
                        .is_some(),
                    "topic '{}' of '{}' has no schema field",
                    topic.id,
                    template.id
                );
            }
        }
    }

    #[test]
    fn helpdesk_template_uses_the_helpdesk_strategy() {
        let stored = built_in_templates()
            .iter()
            .find(|s| s.template.id == "it-helpdesk")
            .unwrap();
        assert_eq!(stored.template.strategy, StrategyKind::Helpdesk);
    }

    #[test]
    fn helpdesk_category_options_match_the_prompt_taxonomy() {
        let stored = built_in_templates()
            .iter()
            .find(|s| s.template.id == "it-helpdesk")
            .unwrap();
        let field = stored.template.schema.field("category").unwrap();
        assert_eq!(
            field.options().unwrap(),
            &["hardware", "software", "access", "network", "other"]
        );
        assert!(validate_schema(&stored.template.schema).is_empty());
    }

    #[test]
    fn built_ins_are_uniquely_identified() {
        let mut ids: Vec<&str> = built_in_templates()
            .iter()
            .map(|s| s.template.id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), built_in_templates().len());
    }
}
