//! Caller authorization context
//!
//! Authorization is passed explicitly into engine operations as a value;
//! engines never infer the caller from ambient request state.

use serde::{Deserialize, Serialize};

/// Elevated permissions a caller may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Mutate or delete budgets owned by other users
    ManageAllBudgets,
    /// Read compensation-derived figures (hourly rate, monthly salary)
    ViewCompensation,
}

/// Identity and permissions of the calling user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
    pub permissions: Vec<Permission>,
}

impl AuthContext {
    /// Context for a caller with no elevated permissions
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), permissions: Vec::new() }
    }

    /// Add an elevated permission
    #[must_use]
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    /// Whether the caller holds a permission
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}
