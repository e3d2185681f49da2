use crate::delivery::{TurnId, TurnState};
use chatmind_core_types::ConversationId;
use serde::{Deserialize, Serialize};

/// Failure conditions surfaced on the coordinator's notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    StoreRejected,
    StoreUnavailable,
    ResponderUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PipelineEvent {
    #[serde(rename_all = "camelCase")]
    TurnStateChanged {
        conversation_id: ConversationId,
        turn_id: TurnId,
        state: TurnState,
        timestamp_ms: i64,
    },
    #[serde(rename_all = "camelCase")]
    DeliveryFailed {
        conversation_id: ConversationId,
        failure: FailureKind,
        timestamp_ms: i64,
    },
}

impl PipelineEvent {
    pub fn conversation_id(&self) -> ConversationId {
        match self {
            PipelineEvent::TurnStateChanged {
                conversation_id, ..
            }
            | PipelineEvent::DeliveryFailed {
                conversation_id, ..
            } => *conversation_id,
        }
    }
}
