//! Acting-user identity.

use clicktrail_audit_types::ANONYMOUS_USER;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared identity store read by the record builder.
///
/// Clones share the same identity; setting it on one handle is visible
/// through every other.
#[derive(Debug, Clone, Default)]
pub struct TrackingContext {
    user_id: Arc<RwLock<Option<String>>>,
}

impl TrackingContext {
    /// Context with no identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with an initial identity.
    pub fn with_user_id(self, user_id: impl Into<String>) -> Self {
        self.set_user_id(user_id);
        self
    }

    /// Replace the identity.
    pub fn set_user_id(&self, user_id: impl Into<String>) {
        *self.user_id.write() = Some(user_id.into());
    }

    /// Forget the identity.
    pub fn clear_user_id(&self) {
        *self.user_id.write() = None;
    }

    /// Current identity, or the anonymous sentinel.
    pub fn user_id(&self) -> String {
        self.user_id
            .read()
            .clone()
            .unwrap_or_else(|| ANONYMOUS_USER.to_string())
    }

    /// Whether an explicit identity is set.
    pub fn is_identified(&self) -> bool {
        self.user_id.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_lifecycle() {
        let context = TrackingContext::new();
        assert_eq!(context.user_id(), "anonymous");
        assert!(!context.is_identified());

        let shared = context.clone();
        shared.set_user_id("u-42");
        assert_eq!(context.user_id(), "u-42");

        context.clear_user_id();
        assert_eq!(shared.user_id(), "anonymous");
    }

    #[test]
    fn test_with_user_id() {
        let context = TrackingContext::new().with_user_id("alice");
        assert!(context.is_identified());
        assert_eq!(context.user_id(), "alice");
    }
}
