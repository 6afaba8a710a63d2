//! End-to-end flow: template registry, conversation engine, scripted
//! language model, and submission processor working together.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use convoform::domain::engine::ConversationEngine;
use convoform::domain::foundation::FormId;
use convoform::domain::mapping::{self, AuthenticatedUser, FormField, ProcessorOptions};
use convoform::domain::model::{ExtractionSchema, FieldType, FieldValidation};
use convoform::domain::state::{CompletionReason, Message, MessageRole};
use convoform::domain::templates::{ConfigOverrides, TemplateRegistry};
use convoform::ports::{LanguageModel, LlmError};

/// Replays scripted assistant replies and one fixed extraction result.
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    extraction: serde_json::Value,
}

impl ScriptedModel {
    fn new(replies: &[&str], extraction: serde_json::Value) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            extraction,
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, _messages: &[Message]) -> Result<String, LlmError> {
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "Anything else?".to_string()))
    }

    async fn extract(
        &self,
        _messages: &[Message],
        _schema: &ExtractionSchema,
    ) -> Result<serde_json::Value, LlmError> {
        Ok(self.extraction.clone())
    }
}

fn target_form() -> Vec<FormField> {
    vec![
        FormField::new("category", "Category", FieldType::Enum)
            .required()
            .with_validation(FieldValidation {
                options: Some(
                    ["hardware", "software", "access", "network", "other"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
                ..Default::default()
            }),
        FormField::new("ticket.description", "Description", FieldType::String).required(),
        FormField::new("urgency", "Urgency", FieldType::String),
    ]
}

#[tokio::test]
async fn helpdesk_conversation_from_template_to_submission() {
    let registry = TemplateRegistry::with_built_ins();

    // Lower the confidence floor so a short scripted conversation can
    // finish naturally.
    let mut applied = registry
        .apply("it-helpdesk", &ConfigOverrides::default())
        .unwrap();
    applied.config.limits.min_confidence = 0.5;

    let mut engine = ConversationEngine::new(FormId::new(), applied.config.clone());
    engine.initialize(&registry);
    assert_eq!(engine.messages()[0].role, MessageRole::System);
    assert!(engine.messages()[0]
        .content
        .contains("IT support intake assistant"));

    let model = ScriptedModel::new(
        &[
            "Sorry to hear that. What exactly happens on the screen?",
            "When did this start, and does it affect anything else?",
            "Understood. How urgent is this for you?",
            "Thanks, I have everything I need. Logging your ticket now.",
        ],
        json!({
            "category": "hardware",
            "description": "Laptop screen broken, errors since this morning's crash",
            "urgency": "high, blocked today",
            "attempted_fixes": "reboot and driver reinstall"
        }),
    );

    let user_turns = [
        "My laptop screen is broken and the computer shows an error message since it crashed this morning",
        "It started yesterday and now the application fails with the same error message every time it happens",
        "This is urgent because I am blocked today and my deadline is close without the laptop",
        "I already tried a reboot and reinstalled the driver but the hardware in the laptop still will not respond",
    ];

    let mut completed = false;
    for text in user_turns {
        let outcome = engine.process_user_message(text);
        let reply = model.generate(engine.messages()).await.unwrap();
        engine.add_assistant_response(reply);
        assert!(!outcome.guidance.is_empty());
        completed = outcome.should_complete;
    }

    assert!(completed, "scripted conversation should finish naturally");
    assert_eq!(engine.completion_reason(), Some(CompletionReason::Completed));

    let summary = engine.coverage_summary();
    assert_eq!(summary.required, 2);
    assert_eq!(summary.required_covered, 2);
    assert_eq!(summary.covered, summary.total);

    // Extraction runs once the conversation is over.
    let mut state = engine.state().clone();
    let extracted = model.extract(engine.messages(), &applied.config.schema).await.unwrap();
    state.merge_extractions(extracted);

    let user = AuthenticatedUser {
        id: "user-7".to_string(),
        email: Some("reporter@example.test".to_string()),
        name: Some("Reporter".to_string()),
    };
    let outcome = mapping::process(
        &state,
        &applied.config,
        &target_form(),
        Some(&user),
        &ProcessorOptions::default(),
        Some(&registry),
    );

    assert!(outcome.success, "processing failed: {:?}", outcome.error);
    assert!(outcome.missing_required_fields.is_empty());
    assert!(outcome.warnings.is_empty(), "warnings: {:?}", outcome.warnings);

    let submission = outcome.submission_data.unwrap();
    assert_eq!(submission.data["category"], "hardware");
    assert!(submission.data["ticket.description"]
        .as_str()
        .unwrap()
        .contains("screen"));
    assert_eq!(submission.data["urgency"], "high, blocked today");

    let meta = &submission.meta;
    assert_eq!(meta.submission_type, "conversational");
    assert_eq!(meta.turn_count, 4);
    assert_eq!(meta.completion_reason, CompletionReason::Completed);
    assert!(meta.confidence >= 0.5);
    // The schema in the metadata is the template's, resolved via the
    // registry.
    assert!(meta.schema.iter().any(|f| f.name == "category" && f.required));

    // attempted_fixes has no target field on this form.
    let unmapped = meta.unmapped_fields.as_ref().unwrap();
    assert!(unmapped.contains_key("attempted_fixes"));

    let report = meta.mapping_report.as_ref().unwrap();
    let description_row = report
        .iter()
        .find(|r| r.source_field == "description")
        .unwrap();
    assert_eq!(description_row.form_path.as_deref(), Some("ticket.description"));

    // Transcript carries the whole exchange, system message included.
    assert_eq!(meta.transcript.len(), 1 + user_turns.len() * 2);
    assert_eq!(meta.submitted_by.as_ref().unwrap().id, "user-7");
}

#[tokio::test]
async fn rambling_conversation_ends_at_the_turn_limit() {
    let registry = TemplateRegistry::with_built_ins();
    let mut applied = registry
        .apply("general-intake", &ConfigOverrides::default())
        .unwrap();
    applied.config.limits.max_turns = 2;

    let mut engine = ConversationEngine::new(FormId::new(), applied.config.clone());
    engine.initialize(&registry);

    // Short off-topic messages earn no coverage at all.
    engine.process_user_message("hm");
    let last = engine.process_user_message("ok");

    assert!(last.should_complete);
    assert_eq!(engine.completion_reason(), Some(CompletionReason::TurnLimit));

    let state = engine.state().clone();
    let outcome = mapping::process(
        &state,
        &applied.config,
        &target_form(),
        None,
        &ProcessorOptions::default(),
        Some(&registry),
    );

    assert!(outcome.success);
    let meta = outcome.submission_data.unwrap().meta;
    assert_eq!(meta.completion_reason, CompletionReason::TurnLimit);
    // Nothing was extracted, so both required form fields are missing.
    assert_eq!(outcome.missing_required_fields.len(), 2);
}
