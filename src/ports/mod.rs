//! Ports: interfaces the domain requires from the outside world.
//!
//! Implementations live in adapter crates or the host application;
//! this crate ships the contracts plus in-memory test doubles only.

mod conversation_store;
mod llm;
mod template_source;

pub use conversation_store::{ConversationStore, StoreError};
pub use llm::{LanguageModel, LlmError};
pub use template_source::{TemplateSource, TemplateSourceError};
