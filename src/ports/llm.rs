//! Language Model Port - Interface for LLM provider integrations.
//!
//! Abstracts the two model capabilities the engine consumes: free-form
//! reply generation and schema-guided extraction. Implementations
//! connect to external providers and translate between the provider API
//! and our domain types; this crate ships only test mocks.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::model::ExtractionSchema;
use crate::domain::state::Message;

/// Failure modes shared by all model providers.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider request failed: {0}")]
    Provider(String),

    #[error("rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("conversation exceeds the provider context window")]
    ContextTooLong,

    #[error("provider returned malformed output: {0}")]
    MalformedResponse(String),
}

/// Port for language model interactions.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generates the next assistant reply from the full message list
    /// (system message, history, and any guidance the caller appended).
    async fn generate(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// Extracts structured values from the conversation, keyed by the
    /// schema's field names. Fields the conversation never addressed
    /// may be absent from the result.
    async fn extract(
        &self,
        messages: &[Message],
        schema: &ExtractionSchema,
    ) -> Result<serde_json::Value, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExtractionField, FieldType};
    use serde_json::json;

    struct ScriptedModel {
        reply: String,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, _messages: &[Message]) -> Result<String, LlmError> {
            Ok(self.reply.clone())
        }

        async fn extract(
            &self,
            _messages: &[Message],
            schema: &ExtractionSchema,
        ) -> Result<serde_json::Value, LlmError> {
            let mut out = serde_json::Map::new();
            for field in &schema.fields {
                out.insert(field.name.clone(), json!("stub"));
            }
            Ok(serde_json::Value::Object(out))
        }
    }

    #[tokio::test]
    async fn mock_generates_a_reply() {
        let model = ScriptedModel {
            reply: "What seems to be the trouble?".to_string(),
        };
        let reply = model.generate(&[Message::user("help")]).await.unwrap();
        assert_eq!(reply, "What seems to be the trouble?");
    }

    #[tokio::test]
    async fn extraction_is_keyed_by_schema_field_names() {
        let model = ScriptedModel {
            reply: String::new(),
        };
        let schema = ExtractionSchema::new(vec![ExtractionField::new(
            "category",
            FieldType::String,
        )]);
        let value = model.extract(&[], &schema).await.unwrap();
        assert!(value.get("category").is_some());
    }
}
