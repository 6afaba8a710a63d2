//! Conversation state machine.
//!
//! Owns the turn-by-turn runtime state: message history, per-topic
//! coverage, confidence, and completion. All transitions are pure
//! functions of already-fetched inputs; nothing here performs I/O.

mod completion;
mod conversation;
mod coverage;

pub use completion::{confidence, evaluate, CompletionCheck, CompletionReason};
pub use conversation::{ConversationState, ConversationStatus, Message, MessageRole};
pub use coverage::{CoverageAnalyzer, KeywordCoverageAnalyzer};
