//! Timer lifecycle
//!
//! Per-user start/pause/resume/stop state machine with paused-time
//! accounting.

pub mod ports;
pub mod service;

pub use ports::{EventPublisher, TimeRecordStore};
pub use service::TimerEngine;
