//! Audit trail
//!
//! Best-effort, append-only record of timer actions for compliance
//! review.

pub mod ports;
pub mod service;

pub use ports::AuditStore;
pub use service::AuditTrail;
