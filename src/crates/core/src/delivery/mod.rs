//! Delivery layer
//!
//! Owns the per-conversation turn slot: one send-and-trigger round trip per
//! user action, busy rejection for overlapping sends, failures surfaced
//! without losing the user's input.

pub mod coordinator;
pub mod turn;

pub use coordinator::{DeliveryCoordinator, DEFAULT_REPLY_TIMEOUT};
pub use turn::{Turn, TurnId, TurnState};
