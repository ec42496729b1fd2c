//! Port interfaces for budget management

use async_trait::async_trait;
use workledger_domain::{Budget, BudgetUpdate, Result};

/// Trait for persisting and querying budget definitions
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Persist a freshly created budget
    async fn create(&self, budget: Budget) -> Result<Budget>;

    /// Look up a budget by id
    async fn find_by_id(&self, id: &str) -> Result<Option<Budget>>;

    /// Every stored budget
    async fn list(&self) -> Result<Vec<Budget>>;

    /// Apply a closed update atomically
    ///
    /// Returns the updated budget, or `None` when no budget has this id.
    async fn update(&self, id: &str, update: BudgetUpdate) -> Result<Option<Budget>>;

    /// Remove a budget
    async fn delete(&self, id: &str) -> Result<()>;
}
