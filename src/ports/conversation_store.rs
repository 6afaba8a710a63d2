//! Conversation Store Port - Interface for draft-state persistence.
//!
//! Conversations live as per-organization draft documents between
//! turns. The engine itself never touches storage; the transport layer
//! loads state, runs a turn, and saves the result through this port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ConversationId, FormId};
use crate::domain::state::ConversationState;

/// Failure modes of the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("stored conversation is corrupt: {0}")]
    Corrupt(String),
}

/// Port for persisting conversation state between turns.
///
/// All operations are scoped to an organization; implementations must
/// never return another organization's conversations.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads a conversation, optionally pinned to a specific form.
    /// `None` when the conversation does not exist in this scope.
    async fn load(
        &self,
        org_id: &str,
        conversation_id: ConversationId,
        form_id: Option<FormId>,
    ) -> Result<Option<ConversationState>, StoreError>;

    /// Upserts the full state document.
    async fn save(&self, org_id: &str, state: &ConversationState) -> Result<(), StoreError>;

    /// Deletes a conversation. Deleting a missing one is not an error.
    async fn delete(&self, org_id: &str, conversation_id: ConversationId)
        -> Result<(), StoreError>;

    /// Lists active conversations, optionally narrowed to one form.
    async fn list_active(
        &self,
        org_id: &str,
        form_id: Option<FormId>,
    ) -> Result<Vec<ConversationState>, StoreError>;

    /// Deletes active conversations idle longer than `hours_old`,
    /// returning how many were removed.
    async fn cleanup_abandoned(&self, org_id: &str, hours_old: u32) -> Result<usize, StoreError>;
}
