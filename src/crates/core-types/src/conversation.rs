use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ConversationId = Uuid;

/// A titled, ordered collection of messages exchanged between one user and
/// the responder. The title is mutable display metadata; the message
/// sequence itself is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Bumped on every append; conversation lists sort by this, newest first.
    pub updated_at: DateTime<Utc>,
}
