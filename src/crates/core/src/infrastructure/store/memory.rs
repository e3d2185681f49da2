use super::{ConversationStore, StoreError};
use async_trait::async_trait;
use chatmind_core_types::{
    AuthorKind, Conversation, ConversationId, Message, SessionContext, UserId,
};
use chrono::Utc;
use dashmap::DashMap;
use log::debug;
use tokio::sync::broadcast;
use uuid::Uuid;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

struct ConversationRecord {
    conversation: Conversation,
    owner: UserId,
    messages: Vec<Message>,
    snapshots: broadcast::Sender<Vec<Message>>,
}

impl ConversationRecord {
    fn ordered_messages(&self) -> Vec<Message> {
        let mut messages = self.messages.clone();
        messages.sort_by_key(Message::sort_key);
        messages
    }

    fn authorize(&self, ctx: &SessionContext) -> Result<(), StoreError> {
        if ctx.is_service() || ctx.user_id == self.owner {
            Ok(())
        } else {
            Err(StoreError::Rejected(format!(
                "user {} is not the conversation owner",
                ctx.user_id
            )))
        }
    }
}

/// In-memory conversation store (single-process MVP).
///
/// Every successful append bumps the conversation's `updated_at` and
/// broadcasts the new full snapshot to subscribers. Lagging subscribers see
/// standard broadcast semantics: they miss intermediate snapshots, never
/// partial ones.
pub struct MemoryStore {
    conversations: DashMap<ConversationId, ConversationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            conversations: DashMap::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_conversation(
        &self,
        ctx: &SessionContext,
        title: &str,
    ) -> Result<Conversation, StoreError> {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);

        self.conversations.insert(
            conversation.id,
            ConversationRecord {
                conversation: conversation.clone(),
                owner: ctx.user_id,
                messages: Vec::new(),
                snapshots,
            },
        );

        debug!(
            "Conversation created: conversation_id={}, owner={}",
            conversation.id, ctx.user_id
        );
        Ok(conversation)
    }

    async fn append_message(
        &self,
        ctx: &SessionContext,
        conversation_id: ConversationId,
        body: &str,
        author: AuthorKind,
    ) -> Result<Message, StoreError> {
        let mut record = self
            .conversations
            .get_mut(&conversation_id)
            .ok_or(StoreError::NotFound(conversation_id))?;
        record.authorize(ctx)?;

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            author,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        record.messages.push(message.clone());
        record.conversation.updated_at = message.created_at;

        // Full snapshot per change, not a diff.
        let _ = record.snapshots.send(record.ordered_messages());
        Ok(message)
    }

    async fn fetch_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, StoreError> {
        let record = self
            .conversations
            .get(&conversation_id)
            .ok_or(StoreError::NotFound(conversation_id))?;
        Ok(record.ordered_messages())
    }

    async fn subscribe(
        &self,
        conversation_id: ConversationId,
    ) -> Result<broadcast::Receiver<Vec<Message>>, StoreError> {
        let record = self
            .conversations
            .get(&conversation_id)
            .ok_or(StoreError::NotFound(conversation_id))?;
        Ok(record.snapshots.subscribe())
    }

    async fn list_conversations(
        &self,
        ctx: &SessionContext,
    ) -> Result<Vec<Conversation>, StoreError> {
        let mut conversations: Vec<Conversation> = self
            .conversations
            .iter()
            .filter(|record| ctx.is_service() || record.owner == ctx.user_id)
            .map(|record| record.conversation.clone())
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn rename_conversation(
        &self,
        ctx: &SessionContext,
        conversation_id: ConversationId,
        title: &str,
    ) -> Result<(), StoreError> {
        let mut record = self
            .conversations
            .get_mut(&conversation_id)
            .ok_or(StoreError::NotFound(conversation_id))?;
        record.authorize(ctx)?;
        record.conversation.title = title.to_string();
        record.conversation.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_ctx() -> SessionContext {
        SessionContext::new(Uuid::from_u128(11))
    }

    #[tokio::test]
    async fn append_broadcasts_full_ordered_snapshot() {
        let store = MemoryStore::new();
        let ctx = owner_ctx();
        let conversation = store
            .create_conversation(&ctx, "First chat")
            .await
            .expect("create conversation");
        let mut rx = store
            .subscribe(conversation.id)
            .await
            .expect("subscribe to conversation");

        store
            .append_message(&ctx, conversation.id, "Hello", AuthorKind::User)
            .await
            .expect("append first");
        store
            .append_message(&ctx, conversation.id, "Anyone there?", AuthorKind::User)
            .await
            .expect("append second");

        let first = rx.recv().await.expect("first snapshot");
        assert_eq!(first.len(), 1);
        let second = rx.recv().await.expect("second snapshot");
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].body, "Hello");
        assert_eq!(second[1].body, "Anyone there?");
        assert!(second[0].created_at <= second[1].created_at);
    }

    #[tokio::test]
    async fn non_owner_append_is_rejected() {
        let store = MemoryStore::new();
        let conversation = store
            .create_conversation(&owner_ctx(), "Private")
            .await
            .expect("create conversation");

        let stranger = SessionContext::new(Uuid::from_u128(99));
        let err = store
            .append_message(&stranger, conversation.id, "intruding", AuthorKind::User)
            .await
            .expect_err("stranger append must fail");
        assert!(matches!(err, StoreError::Rejected(_)));

        let messages = store
            .fetch_messages(conversation.id)
            .await
            .expect("fetch messages");
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn service_identity_may_append_anywhere() {
        let store = MemoryStore::new();
        let conversation = store
            .create_conversation(&owner_ctx(), "Bot replies here")
            .await
            .expect("create conversation");

        store
            .append_message(
                &SessionContext::service(),
                conversation.id,
                "A reply",
                AuthorKind::Responder,
            )
            .await
            .expect("service append succeeds");

        let messages = store
            .fetch_messages(conversation.id)
            .await
            .expect("fetch messages");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_responder());
    }

    #[tokio::test]
    async fn conversations_list_most_recently_active_first() {
        let store = MemoryStore::new();
        let ctx = owner_ctx();
        let older = store
            .create_conversation(&ctx, "Older")
            .await
            .expect("create older");
        let newer = store
            .create_conversation(&ctx, "Newer")
            .await
            .expect("create newer");

        store
            .append_message(&ctx, older.id, "bump", AuthorKind::User)
            .await
            .expect("append bump");

        let listed = store.list_conversations(&ctx).await.expect("list");
        assert_eq!(listed[0].id, older.id);
        assert_eq!(listed[1].id, newer.id);
    }

    #[tokio::test]
    async fn rename_updates_title_only() {
        let store = MemoryStore::new();
        let ctx = owner_ctx();
        let conversation = store
            .create_conversation(&ctx, "Untitled")
            .await
            .expect("create conversation");

        store
            .rename_conversation(&ctx, conversation.id, "Trip planning")
            .await
            .expect("rename");

        let listed = store.list_conversations(&ctx).await.expect("list");
        assert_eq!(listed[0].title, "Trip planning");
        assert_eq!(listed[0].id, conversation.id);
    }
}
