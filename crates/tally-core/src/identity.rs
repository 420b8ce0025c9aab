use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Supplies the actor and correlation id for the current logical operation.
pub trait IdentityProvider {
    fn current_user_id(&self) -> &str;

    /// Stable for the life of one logical operation.
    fn current_correlation_id(&self) -> &str;
}

/// Who is committing, and which logical operation the commit belongs to.
///
/// Passed explicitly into every commit. One request mutating three entities
/// yields three audit entries sharing this `correlation_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IdentityContext {
    pub user_id: String,
    pub correlation_id: String,
}

impl IdentityContext {
    #[must_use]
    pub fn new(user_id: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            correlation_id: correlation_id.into(),
        }
    }

    /// Copy of this context acting as a different user, same operation.
    #[must_use]
    pub fn with_user(&self, user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            correlation_id: self.correlation_id.clone(),
        }
    }
}

impl IdentityProvider for IdentityContext {
    fn current_user_id(&self) -> &str {
        &self.user_id
    }

    fn current_correlation_id(&self) -> &str {
        &self.correlation_id
    }
}
