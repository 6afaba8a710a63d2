//! Domain layer containing the conversational form engine.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (typed IDs)
//! - `model` - Topics, extraction schema, persona, limits, config
//! - `prompts` - Prompt strategies that turn state into LLM instructions
//! - `state` - Conversation state machine and coverage analysis
//! - `templates` - Template registry with built-in and org-scoped entries
//! - `engine` - The per-conversation orchestrator
//! - `mapping` - Post-completion extraction-to-form mapping processor

pub mod engine;
pub mod foundation;
pub mod mapping;
pub mod model;
pub mod prompts;
pub mod state;
pub mod templates;
