//! Time utilities
//!
//! Wall-clock abstraction plus calendar bucketing helpers used by the
//! aggregation engines.

pub mod calendar;
pub mod clock;

pub use calendar::{day_key, days_spanned, format_minutes, month_key};
pub use clock::{Clock, MockClock, SystemClock};
