//! Pipeline error taxonomy
//!
//! Every failure here is recovered at the coordinator/presenter boundary and
//! turned into a UI-visible state; nothing is fatal to the process.

use chatmind_core_types::ConversationId;
use thiserror::Error;

pub type ChatMindResult<T> = Result<T, ChatMindError>;

#[derive(Debug, Error)]
pub enum ChatMindError {
    /// Empty or whitespace-only submission. Rejected before any I/O, no
    /// state change.
    #[error("input rejected: empty submission")]
    InputRejected,

    /// A turn is already in flight for this conversation. Rejected
    /// synchronously; callers should disable the send control, not retry.
    #[error("conversation busy: {conversation_id}")]
    Busy { conversation_id: ConversationId },

    /// The store refused the append. `text` carries the submitted input so
    /// the caller can restore it instead of losing it.
    #[error("store rejected append: {reason}")]
    StoreRejected { reason: String, text: String },

    /// Transient store failure while appending. Same recovery as a
    /// rejection: `text` is returned to the caller.
    #[error("store unavailable: {reason}")]
    StoreUnavailable { reason: String, text: String },

    /// The responder could not be reached after the user message was
    /// persisted. The message is not rolled back; callers must not
    /// re-append it automatically.
    #[error("responder unavailable: {reason}")]
    ResponderUnavailable { reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl ChatMindError {
    /// The submitted text preserved by the failure, when there is one to
    /// restore into the input control.
    pub fn recovered_text(&self) -> Option<&str> {
        match self {
            ChatMindError::StoreRejected { text, .. }
            | ChatMindError::StoreUnavailable { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ChatMindError::Busy { .. })
    }
}
