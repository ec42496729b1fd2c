//! Cost forecasting
//!
//! Linear-regression projection of future cost from historical daily
//! series.

pub mod service;

pub use service::ForecastEngine;
