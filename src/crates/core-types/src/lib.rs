//! ChatMind shared low-level DTOs
//!
//! Wire-level conversation data shared by the core pipeline and the apps.
//! No business logic lives here.

pub mod conversation;
pub mod message;
pub mod session;

pub use conversation::{Conversation, ConversationId};
pub use message::{AuthorKind, Message, MessageId};
pub use session::{SessionContext, UserId};
