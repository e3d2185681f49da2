// ChatMind Core Library - Platform-agnostic conversation delivery pipeline
// Layered architecture: Util -> Infrastructure -> Delivery -> Presentation

pub mod delivery; // Delivery layer - per-conversation turn state machine
pub mod infrastructure; // Infrastructure layer - store, responder gateway, events
pub mod presentation; // Presentation layer - snapshot ordering, incremental reveal
pub mod util; // Utility layer - errors, helpers

// Export main types
pub use util::errors::{ChatMindError, ChatMindResult};

// Export infrastructure components
pub use infrastructure::events::{EventBus, FailureKind, PipelineEvent};
pub use infrastructure::responder::{CannedResponder, GatewayError, ResponderGateway, TriggerAck};
pub use infrastructure::store::{ConversationStore, MemoryStore, StoreError};

// Export delivery and presentation core types
pub use delivery::{DeliveryCoordinator, Turn, TurnId, TurnState};
pub use presentation::{RenderMessage, RevealSequence, StreamPresenter};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CORE_NAME: &str = "ChatMind Core";
