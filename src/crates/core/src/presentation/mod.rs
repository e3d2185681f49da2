//! Presentation layer
//!
//! Turns pushed message snapshots into a render list: creation-order
//! sorting, recency-based detection of newly arrived replies, and the
//! character-by-character reveal with its autoscroll policy. All state here
//! is transient and per-conversation; nothing is ever persisted.

pub mod presenter;
pub mod reveal;

pub use presenter::{
    RenderMessage, StreamPresenter, CHARS_PER_TICK, RECENCY_WINDOW_MS, TICK_INTERVAL_MS,
};
pub use reveal::RevealSequence;
