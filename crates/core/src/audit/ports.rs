//! Port interfaces for the audit trail

use async_trait::async_trait;
use workledger_domain::{AuditEntry, Result};

/// Trait for appending and querying audit entries
///
/// The backing collection is separate from time records and is
/// append-only; entries are never mutated once written.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one entry
    async fn append(&self, entry: AuditEntry) -> Result<()>;

    /// Most recent entries for a user, newest first
    async fn find_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<AuditEntry>>;
}
