use chatmind_core_types::ConversationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TurnId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Pending,
    AwaitingReply,
    Completed,
    Failed,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Completed | TurnState::Failed)
    }
}

/// One user submission and its in-flight lifecycle.
///
/// Transient: lives only in the coordinator's memory for the duration of a
/// send, and is discarded once the gateway acknowledges or the attempt is
/// abandoned. Never persisted.
#[derive(Debug, Clone)]
pub struct Turn {
    pub id: TurnId,
    pub conversation_id: ConversationId,
    pub text: String,
    pub state: TurnState,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl Turn {
    pub fn new(conversation_id: ConversationId, text: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            text,
            state: TurnState::Pending,
            created_at_ms: now,
            updated_at_ms: now,
        }
    }
}
