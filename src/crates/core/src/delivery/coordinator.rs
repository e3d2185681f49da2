use super::turn::{Turn, TurnId, TurnState};
use crate::infrastructure::events::{EventBus, FailureKind, PipelineEvent};
use crate::infrastructure::responder::ResponderGateway;
use crate::infrastructure::store::{ConversationStore, StoreError};
use crate::util::errors::{ChatMindError, ChatMindResult};
use chatmind_core_types::{AuthorKind, ConversationId, Message, SessionContext};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// Bound on how long a turn may sit in `awaiting-reply` before it is forced
/// to failed with a responder-unavailable condition.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes exactly one send-and-trigger round trip per user action.
///
/// Per conversation there is a single turn slot, never a queue: a submit
/// while a turn is in flight is rejected synchronously with `Busy` so the
/// UI disables the input instead of the coordinator silently queueing.
///
/// All mutation of the slot happens between suspension points on the
/// caller's task; the map itself is the only shared state.
pub struct DeliveryCoordinator {
    store: Arc<dyn ConversationStore>,
    gateway: Arc<dyn ResponderGateway>,
    ctx: SessionContext,
    events: EventBus,
    turns: DashMap<ConversationId, Turn>,
    reply_timeout: Duration,
}

impl DeliveryCoordinator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        gateway: Arc<dyn ResponderGateway>,
        ctx: SessionContext,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            gateway,
            ctx,
            events,
            turns: DashMap::new(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Sends one user message and triggers the responder.
    ///
    /// Resolves once the gateway acknowledges acceptance or failure; it
    /// does not wait for the actual reply, which arrives independently via
    /// the store subscription. On store failure the submitted text is
    /// carried back in the error so the caller can restore it; on gateway
    /// failure the persisted user message stays and must not be re-sent.
    pub async fn submit(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> ChatMindResult<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatMindError::InputRejected);
        }

        // Claim the turn slot. The entry guard is dropped before any await.
        let turn = Turn::new(conversation_id, text.to_string());
        let turn_id = turn.id;
        match self.turns.entry(conversation_id) {
            Entry::Occupied(_) => {
                debug!(
                    "Submit rejected, turn in flight: conversation_id={}",
                    conversation_id
                );
                return Err(ChatMindError::Busy { conversation_id });
            }
            Entry::Vacant(slot) => {
                slot.insert(turn);
            }
        }
        self.emit_turn_state(conversation_id, turn_id, TurnState::Pending);

        let message = match self
            .store
            .append_message(&self.ctx, conversation_id, text, AuthorKind::User)
            .await
        {
            Ok(message) => message,
            Err(e) => {
                let (failure, err) = match e {
                    StoreError::Rejected(reason) => (
                        FailureKind::StoreRejected,
                        ChatMindError::StoreRejected {
                            reason,
                            text: text.to_string(),
                        },
                    ),
                    other => (
                        FailureKind::StoreUnavailable,
                        ChatMindError::StoreUnavailable {
                            reason: other.to_string(),
                            text: text.to_string(),
                        },
                    ),
                };
                self.fail_turn(conversation_id, turn_id, failure);
                return Err(err);
            }
        };

        self.set_awaiting_reply(conversation_id, turn_id);

        let ack = tokio::time::timeout(
            self.reply_timeout,
            self.gateway.trigger(conversation_id, text),
        )
        .await;

        match ack {
            Ok(Ok(ack)) if ack.accepted => {
                self.complete_turn(conversation_id, turn_id);
                Ok(message)
            }
            Ok(Ok(_)) => {
                self.fail_turn(conversation_id, turn_id, FailureKind::ResponderUnavailable);
                Err(ChatMindError::ResponderUnavailable {
                    reason: "trigger refused".to_string(),
                })
            }
            Ok(Err(e)) => {
                self.fail_turn(conversation_id, turn_id, FailureKind::ResponderUnavailable);
                Err(ChatMindError::ResponderUnavailable {
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                warn!(
                    "Responder acknowledgment timed out: conversation_id={}, timeout_ms={}",
                    conversation_id,
                    self.reply_timeout.as_millis()
                );
                self.fail_turn(conversation_id, turn_id, FailureKind::ResponderUnavailable);
                Err(ChatMindError::ResponderUnavailable {
                    reason: format!(
                        "no acknowledgment within {} ms",
                        self.reply_timeout.as_millis()
                    ),
                })
            }
        }
    }

    /// Whether a turn is in flight for the conversation; drives the
    /// disabled state of the send control.
    pub fn is_busy(&self, conversation_id: ConversationId) -> bool {
        self.turns.contains_key(&conversation_id)
    }

    /// Conversation-switch hook: forgets the tracked turn immediately.
    /// In-flight store and gateway calls still run to completion, but their
    /// results no longer mutate the slot or emit events.
    pub fn discard_turn(&self, conversation_id: ConversationId) {
        if self.turns.remove(&conversation_id).is_some() {
            debug!(
                "Turn discarded on conversation switch: conversation_id={}",
                conversation_id
            );
        }
    }

    fn set_awaiting_reply(&self, conversation_id: ConversationId, turn_id: TurnId) {
        let mut updated = false;
        if let Some(mut turn) = self.turns.get_mut(&conversation_id) {
            if turn.id == turn_id {
                turn.state = TurnState::AwaitingReply;
                turn.updated_at_ms = now_ms();
                updated = true;
            }
        }
        if updated {
            self.emit_turn_state(conversation_id, turn_id, TurnState::AwaitingReply);
        }
    }

    fn complete_turn(&self, conversation_id: ConversationId, turn_id: TurnId) {
        if self.release_turn(conversation_id, turn_id) {
            self.emit_turn_state(conversation_id, turn_id, TurnState::Completed);
        }
    }

    fn fail_turn(
        &self,
        conversation_id: ConversationId,
        turn_id: TurnId,
        failure: FailureKind,
    ) {
        if !self.release_turn(conversation_id, turn_id) {
            return;
        }
        self.emit_turn_state(conversation_id, turn_id, TurnState::Failed);
        self.events.emit(PipelineEvent::DeliveryFailed {
            conversation_id,
            failure,
            timestamp_ms: now_ms(),
        });
    }

    /// Frees the slot if it still belongs to this turn. A stale completion
    /// (the turn was discarded by a conversation switch) must not free a
    /// newer turn's slot.
    fn release_turn(&self, conversation_id: ConversationId, turn_id: TurnId) -> bool {
        let released = self
            .turns
            .remove_if(&conversation_id, |_, turn| turn.id == turn_id)
            .is_some();
        if !released {
            debug!(
                "Stale turn result ignored: conversation_id={}, turn_id={}",
                conversation_id, turn_id
            );
        }
        released
    }

    fn emit_turn_state(
        &self,
        conversation_id: ConversationId,
        turn_id: TurnId,
        state: TurnState,
    ) {
        self.events.emit(PipelineEvent::TurnStateChanged {
            conversation_id,
            turn_id,
            state,
            timestamp_ms: now_ms(),
        });
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
