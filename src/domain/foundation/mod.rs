//! Shared domain primitives.

mod ids;

pub use ids::{ConversationId, FormId};
