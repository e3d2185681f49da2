use chatmind_core::infrastructure::events::{EventBus, PipelineEvent};
use chatmind_core::infrastructure::responder::CannedResponder;
use chatmind_core::infrastructure::store::{ConversationStore, MemoryStore};
use chatmind_core::{DeliveryCoordinator, StreamPresenter, TurnState};
use chatmind_core_types::{AuthorKind, SessionContext};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Full round trip through the pipeline: submit a user message, receive the
/// responder's reply via the store subscription, and reveal it through the
/// presenter down to the full body.
#[tokio::test]
async fn user_message_round_trips_into_a_revealed_reply() {
    let store = Arc::new(MemoryStore::new());
    let ctx = SessionContext::new(Uuid::from_u128(42)).with_display_name("Smoke Tester");
    let conversation = store
        .create_conversation(&ctx, "Smoke test chat")
        .await
        .expect("create conversation");

    let responder = Arc::new(
        CannedResponder::new(store.clone()).with_delay(Duration::from_millis(5), Duration::ZERO),
    );
    let events = EventBus::new();
    let mut event_rx = events.subscribe();
    let coordinator =
        DeliveryCoordinator::new(store.clone(), responder, ctx.clone(), events);

    let mut snapshots = store
        .subscribe(conversation.id)
        .await
        .expect("subscribe to conversation");

    let mut presenter = StreamPresenter::new();
    presenter.set_active_conversation(conversation.id);

    let sent = coordinator
        .submit(conversation.id, "Hello there")
        .await
        .expect("submit succeeds");
    assert_eq!(sent.author, AuthorKind::User);
    assert!(!coordinator.is_busy(conversation.id));
    presenter.note_user_send();

    // First snapshot carries the user message, a later one the reply.
    let reply_body = loop {
        let snapshot = tokio::time::timeout(Duration::from_secs(2), snapshots.recv())
            .await
            .expect("snapshot within two seconds")
            .expect("snapshot delivered");
        let reply = snapshot.iter().find(|m| m.is_responder()).cloned();
        presenter.apply_snapshot(snapshot, Utc::now());
        if let Some(reply) = reply {
            break reply.body;
        }
    };

    // The fresh reply starts revealing and ticks down to the full body.
    assert!(presenter.has_active_reveal());
    let mut ticks = 0;
    while presenter.has_active_reveal() {
        presenter.tick();
        ticks += 1;
        assert!(ticks <= reply_body.chars().count(), "reveal must terminate");
    }
    let list = presenter.render_list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].visible_body(), "Hello there");
    assert_eq!(list[1].visible_body(), reply_body);
    assert!(presenter.take_scroll_request());

    // The turn walked pending -> awaiting_reply -> completed.
    let mut states = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        if let PipelineEvent::TurnStateChanged { state, .. } = event {
            states.push(state);
        }
    }
    assert_eq!(
        states,
        vec![
            TurnState::Pending,
            TurnState::AwaitingReply,
            TurnState::Completed
        ]
    );
}
