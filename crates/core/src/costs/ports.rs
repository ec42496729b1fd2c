//! Port interfaces for cost aggregation

use async_trait::async_trait;
use workledger_domain::{Result, UserProfile};

/// Trait for resolving users to display identity and compensation
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user id; `None` when the directory has no such user
    async fn resolve(&self, user_id: &str) -> Result<Option<UserProfile>>;
}
