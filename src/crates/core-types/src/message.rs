use crate::conversation::ConversationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MessageId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorKind {
    User,
    Responder,
}

/// One immutable entry in a conversation's append-only message log.
///
/// Within a conversation, messages are totally ordered by creation
/// timestamp, ties broken by id; see [`Message::sort_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub author: AuthorKind,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_responder(&self) -> bool {
        self.author == AuthorKind::Responder
    }

    /// Display-order key: creation time ascending, id as the tie-break.
    pub fn sort_key(&self) -> (DateTime<Utc>, MessageId) {
        (self.created_at, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: u128, created_at: DateTime<Utc>) -> Message {
        Message {
            id: Uuid::from_u128(id),
            conversation_id: Uuid::from_u128(1),
            author: AuthorKind::User,
            body: "hi".to_string(),
            created_at,
        }
    }

    #[test]
    fn sort_key_breaks_timestamp_ties_by_id() {
        let at = Utc::now();
        let a = message(2, at);
        let b = message(7, at);
        assert!(a.sort_key() < b.sort_key());
    }

    #[test]
    fn wire_casing_matches_subscribers() {
        let m = message(3, Utc::now());
        let value = serde_json::to_value(&m).expect("serialize message");
        assert!(value.get("conversationId").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["author"], "user");
    }
}
