use super::reveal::RevealSequence;
use chatmind_core_types::{Message, MessageId};
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;

/// A snapshot message is treated as newly arrived only when it was created
/// within this many milliseconds of the snapshot being applied. The
/// transport pushes full snapshots, not diffs, so age is the only way to
/// tell "just arrived" apart from "re-delivered". Known to be fragile under
/// clock skew; accepted limitation.
pub const RECENCY_WINDOW_MS: i64 = 2_000;

/// Reveal cadence.
pub const TICK_INTERVAL_MS: u64 = 30;
pub const CHARS_PER_TICK: usize = 1;

/// One entry of the render list handed to the UI.
#[derive(Debug, Clone)]
pub struct RenderMessage {
    pub message: Message,
    pub shown_chars: usize,
    pub total_chars: usize,
}

impl RenderMessage {
    pub fn is_revealing(&self) -> bool {
        self.shown_chars < self.total_chars
    }

    pub fn reveal_fraction(&self) -> f64 {
        if self.total_chars == 0 {
            1.0
        } else {
            self.shown_chars as f64 / self.total_chars as f64
        }
    }

    /// The prefix currently on screen. Falls back to the full body once the
    /// reveal has finished or was abandoned.
    pub fn visible_body(&self) -> &str {
        if self.is_revealing() {
            let end = self
                .message
                .body
                .char_indices()
                .nth(self.shown_chars)
                .map(|(i, _)| i)
                .unwrap_or(self.message.body.len());
            &self.message.body[..end]
        } else {
            &self.message.body
        }
    }
}

/// Renders the live message sequence for one conversation at a time.
///
/// Owns all presentation state exclusively: the caller drives it from a
/// single task, so methods take `&mut self` and no internal locking exists.
/// Responder messages that appear inside the recency window are revealed
/// character by character; everything else renders its full body at once.
pub struct StreamPresenter {
    active: Option<chatmind_core_types::ConversationId>,
    messages: Vec<Message>,
    seen: HashSet<MessageId>,
    revealing: HashMap<MessageId, RevealSequence>,
    reveal_cancel: CancellationToken,
    at_bottom: bool,
    pending_scroll: bool,
}

impl StreamPresenter {
    pub fn new() -> Self {
        Self {
            active: None,
            messages: Vec::new(),
            seen: HashSet::new(),
            revealing: HashMap::new(),
            reveal_cancel: CancellationToken::new(),
            at_bottom: true,
            pending_scroll: false,
        }
    }

    pub fn active_conversation(&self) -> Option<chatmind_core_types::ConversationId> {
        self.active
    }

    /// Switches the displayed conversation. Cancels any in-progress reveal
    /// timers and drops all per-conversation state; the new conversation
    /// starts from a clean slate with auto-follow on.
    pub fn set_active_conversation(
        &mut self,
        conversation_id: chatmind_core_types::ConversationId,
    ) {
        if self.active == Some(conversation_id) {
            return;
        }
        debug!("Presenter switching conversation: conversation_id={}", conversation_id);
        self.reveal_cancel.cancel();
        self.reveal_cancel = CancellationToken::new();
        self.active = Some(conversation_id);
        self.messages.clear();
        self.seen.clear();
        self.revealing.clear();
        self.at_bottom = true;
        self.pending_scroll = false;
    }

    /// Token that is cancelled when the active conversation changes; tick
    /// drivers select on it to stop dead timers.
    pub fn reveal_cancellation(&self) -> CancellationToken {
        self.reveal_cancel.clone()
    }

    /// Applies a full snapshot from the store subscription.
    ///
    /// Display order is creation order with the message id as tie-break,
    /// never arrival order, so the snapshot is re-sorted here. Unseen
    /// responder messages created within the recency window start revealing;
    /// every other unseen message renders complete immediately.
    pub fn apply_snapshot(&mut self, mut snapshot: Vec<Message>, now: DateTime<Utc>) {
        let Some(active) = self.active else {
            return;
        };
        snapshot.retain(|m| m.conversation_id == active);
        snapshot.sort_by_key(Message::sort_key);

        let grew = snapshot.len() > self.messages.len();
        for message in &snapshot {
            if !self.seen.insert(message.id) {
                continue;
            }
            let age_ms = now
                .signed_duration_since(message.created_at)
                .num_milliseconds();
            if message.is_responder()
                && !message.body.is_empty()
                && (0..=RECENCY_WINDOW_MS).contains(&age_ms)
            {
                self.revealing
                    .insert(message.id, RevealSequence::new(message.body.clone()));
            }
        }
        self.messages = snapshot;

        if grew && self.at_bottom {
            self.pending_scroll = true;
        }
    }

    /// Advances every in-progress reveal by one cadence step. Call once per
    /// `TICK_INTERVAL_MS`.
    pub fn tick(&mut self) {
        if self.revealing.is_empty() {
            return;
        }
        self.revealing.retain(|_, seq| seq.advance(CHARS_PER_TICK));
        if self.at_bottom {
            self.pending_scroll = true;
        }
    }

    pub fn has_active_reveal(&self) -> bool {
        !self.revealing.is_empty()
    }

    /// Standalone reveal sequence for a displayed message, replayable from
    /// the start. None if the message is not in the current sequence.
    pub fn reveal(&self, message_id: MessageId) -> Option<RevealSequence> {
        self.messages
            .iter()
            .find(|m| m.id == message_id)
            .map(|m| RevealSequence::new(m.body.clone()))
    }

    /// The current render list in display order.
    pub fn render_list(&self) -> Vec<RenderMessage> {
        self.messages
            .iter()
            .map(|message| {
                let total_chars = message.body.chars().count();
                let shown_chars = self
                    .revealing
                    .get(&message.id)
                    .map(RevealSequence::shown_chars)
                    .unwrap_or(total_chars);
                RenderMessage {
                    message: message.clone(),
                    shown_chars,
                    total_chars,
                }
            })
            .collect()
    }

    /// Whether the view should track the newest content.
    pub fn auto_follow(&self) -> bool {
        self.at_bottom
    }

    /// UI scroll feedback: scrolling away from the bottom suspends
    /// auto-follow until the user returns.
    pub fn note_scroll(&mut self, at_bottom: bool) {
        self.at_bottom = at_bottom;
    }

    /// Sending is the user's own action, so it always forces the view back
    /// to the bottom.
    pub fn note_user_send(&mut self) {
        self.at_bottom = true;
        self.pending_scroll = true;
    }

    /// Consumes the pending scroll-to-bottom request, if any.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.pending_scroll)
    }
}

impl Default for StreamPresenter {
    fn default() -> Self {
        Self::new()
    }
}
