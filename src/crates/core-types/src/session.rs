use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Explicit session identity passed into the pipeline at construction.
///
/// Components never read the current user from ambient state; whoever wires
/// the pipeline decides which identity each component acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SessionContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// The reserved identity under which responder-authored messages are
    /// appended (the all-zeros user id).
    pub fn service() -> Self {
        Self::new(Uuid::nil())
    }

    pub fn is_service(&self) -> bool {
        self.user_id.is_nil()
    }

    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or("You")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_context_is_recognized() {
        assert!(SessionContext::service().is_service());
        assert!(!SessionContext::new(Uuid::from_u128(9)).is_service());
    }
}
