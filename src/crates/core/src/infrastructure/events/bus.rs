use super::types::PipelineEvent;
use log::trace;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out for pipeline events.
///
/// Instance-based on purpose: the bus is handed to components at
/// construction rather than reached through a global. Emitting never fails;
/// events sent with no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: PipelineEvent) {
        if self.tx.send(event).is_err() {
            trace!("Pipeline event dropped: no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::events::FailureKind;
    use uuid::Uuid;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let event = PipelineEvent::DeliveryFailed {
            conversation_id: Uuid::from_u128(1),
            failure: FailureKind::StoreRejected,
            timestamp_ms: 42,
        };
        bus.emit(event.clone());

        assert_eq!(rx.recv().await.expect("event delivered"), event);
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.emit(PipelineEvent::DeliveryFailed {
            conversation_id: Uuid::from_u128(2),
            failure: FailureKind::StoreUnavailable,
            timestamp_ms: 0,
        });
    }
}
