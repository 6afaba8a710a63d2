//! Convoform - Conversational Form Engine
//!
//! This crate drives multi-turn natural-language dialogues that fill
//! structured forms: it tracks which informational topics have been
//! covered, decides when the conversation is complete, and reconciles
//! loosely-typed LLM extractions against a strict form schema.

pub mod domain;
pub mod ports;
