//! Infrastructure layer
//!
//! External collaborators (conversation store, responder gateway) behind
//! traits, plus the in-process event system.

pub mod events;
pub mod responder;
pub mod store;
