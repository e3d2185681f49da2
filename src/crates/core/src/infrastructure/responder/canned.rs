use super::{GatewayError, ResponderGateway, TriggerAck};
use crate::infrastructure::store::ConversationStore;
use async_trait::async_trait;
use chatmind_core_types::{AuthorKind, ConversationId, SessionContext};
use log::{debug, warn};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

const CANNED_RESPONSES: [&str; 8] = [
    "That's an interesting point! Can you tell me more about that?",
    "I understand what you're saying. How does that make you feel?",
    "Thanks for sharing that with me. What would you like to explore next?",
    "That's a great question! Let me think about that for a moment...",
    "I appreciate you bringing that up. Can you provide more context?",
    "That sounds important to you. Would you like to discuss it further?",
    "I see what you mean. What are your thoughts on how to approach this?",
    "That's a valuable insight. How did you come to that conclusion?",
];

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_DELAY_JITTER: Duration = Duration::from_millis(2000);

/// Fixed-list responder: acknowledges immediately, then appends one
/// uniformly-random reply after an artificial processing delay.
///
/// Appends under the service identity, through the same store the user's
/// messages go through: the reply reaches the UI as a pushed snapshot, not
/// as a return value. Append failures inside the spawned task are logged
/// and swallowed; the trigger was already acknowledged.
pub struct CannedResponder {
    store: Arc<dyn ConversationStore>,
    ctx: SessionContext,
    base_delay: Duration,
    delay_jitter: Duration,
}

impl CannedResponder {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            store,
            ctx: SessionContext::service(),
            base_delay: DEFAULT_BASE_DELAY,
            delay_jitter: DEFAULT_DELAY_JITTER,
        }
    }

    pub fn with_delay(mut self, base_delay: Duration, delay_jitter: Duration) -> Self {
        self.base_delay = base_delay;
        self.delay_jitter = delay_jitter;
        self
    }

    fn pick_reply_and_delay(&self) -> (&'static str, Duration) {
        let mut rng = rand::thread_rng();
        let reply = CANNED_RESPONSES[rng.gen_range(0..CANNED_RESPONSES.len())];
        let jitter_ms = self.delay_jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rng.gen_range(0..=jitter_ms)
        };
        (reply, self.base_delay + Duration::from_millis(extra))
    }
}

#[async_trait]
impl ResponderGateway for CannedResponder {
    async fn trigger(
        &self,
        conversation_id: ConversationId,
        _last_user_message: &str,
    ) -> Result<TriggerAck, GatewayError> {
        // Draw before spawning so the RNG is never held across an await.
        let (reply, delay) = self.pick_reply_and_delay();
        let store = self.store.clone();
        let ctx = self.ctx.clone();

        debug!(
            "Responder triggered: conversation_id={}, delay_ms={}",
            conversation_id,
            delay.as_millis()
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = store
                .append_message(&ctx, conversation_id, reply, AuthorKind::Responder)
                .await
            {
                warn!(
                    "Responder reply append failed: conversation_id={}, error={}",
                    conversation_id, e
                );
            }
        });

        Ok(TriggerAck { accepted: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::MemoryStore;
    use uuid::Uuid;

    #[tokio::test]
    async fn trigger_appends_exactly_one_responder_reply() {
        let store: Arc<dyn ConversationStore> = Arc::new(MemoryStore::new());
        let ctx = SessionContext::new(Uuid::from_u128(5));
        let conversation = store
            .create_conversation(&ctx, "Canned test")
            .await
            .expect("create conversation");
        let mut rx = store
            .subscribe(conversation.id)
            .await
            .expect("subscribe");

        let responder = CannedResponder::new(store.clone())
            .with_delay(Duration::from_millis(1), Duration::ZERO);
        let ack = responder
            .trigger(conversation.id, "hello")
            .await
            .expect("trigger acknowledged");
        assert!(ack.accepted);

        let snapshot = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("reply within a second")
            .expect("snapshot delivered");
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot[0].is_responder());
        assert!(CANNED_RESPONSES.contains(&snapshot[0].body.as_str()));
    }
}
