//! Cost aggregation
//!
//! Live burn-rate reporting and historical cost summaries derived from
//! time records and directory compensation data.

pub mod ports;
pub mod service;
pub mod view;

pub use ports::UserDirectory;
pub use service::CostAggregationEngine;
