//! Responder gateway abstraction
//!
//! The responder is an opaque external collaborator: triggering it returns a
//! synchronous acknowledgment only, and the actual reply arrives later as a
//! responder-authored message appended through the conversation store. The
//! delivery contract is asynchronous, unordered, and at-least-once per
//! accepted turn. Never assume the responder is deterministic.

pub mod canned;

pub use canned::CannedResponder;

use async_trait::async_trait;
use chatmind_core_types::ConversationId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("responder gateway unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous acknowledgment of a trigger: accepted or not, nothing about
/// the reply content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerAck {
    pub accepted: bool,
}

#[async_trait]
pub trait ResponderGateway: Send + Sync {
    async fn trigger(
        &self,
        conversation_id: ConversationId,
        last_user_message: &str,
    ) -> Result<TriggerAck, GatewayError>;
}
