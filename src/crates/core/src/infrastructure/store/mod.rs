//! Conversation store abstraction
//!
//! Durable append-only log of messages per conversation. The pipeline only
//! ever talks to the [`ConversationStore`] trait; [`MemoryStore`] is the
//! in-process implementation used by the CLI and the tests.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chatmind_core_types::{
    AuthorKind, Conversation, ConversationId, Message, SessionContext,
};
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller is not authorized for the conversation.
    #[error("append rejected: {0}")]
    Rejected(String),

    /// Transient failure talking to the store.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("conversation not found: {0}")]
    NotFound(ConversationId),
}

/// Append-only conversation log with push subscriptions.
///
/// `subscribe` delivers a full ordered snapshot of the conversation's
/// messages on every change, never a diff. Consumers that need the current
/// state before the first change should `fetch_messages` first.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(
        &self,
        ctx: &SessionContext,
        title: &str,
    ) -> Result<Conversation, StoreError>;

    /// Appends one immutable message. Fails with [`StoreError::Rejected`]
    /// when `ctx` is neither the conversation owner nor the service
    /// identity.
    async fn append_message(
        &self,
        ctx: &SessionContext,
        conversation_id: ConversationId,
        body: &str,
        author: AuthorKind,
    ) -> Result<Message, StoreError>;

    /// Point-in-time ordered message sequence.
    async fn fetch_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, StoreError>;

    async fn subscribe(
        &self,
        conversation_id: ConversationId,
    ) -> Result<broadcast::Receiver<Vec<Message>>, StoreError>;

    /// Conversations visible to `ctx`, most recently active first.
    async fn list_conversations(
        &self,
        ctx: &SessionContext,
    ) -> Result<Vec<Conversation>, StoreError>;

    /// Title is mutable display metadata only.
    async fn rename_conversation(
        &self,
        ctx: &SessionContext,
        conversation_id: ConversationId,
        title: &str,
    ) -> Result<(), StoreError>;
}
