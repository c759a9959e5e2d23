//! OpenDesk SLA - deadlines and escalation
//!
//! - `SlaMatrix`: urgency × impact → response/resolution targets
//! - `SlaCalculator`: turns a target into a per-ticket tracking record
//! - `SlaMonitor`: run-exclusive periodic scan emitting deduplicated
//!   escalation alerts
//!
//! The monitor is pure state + scan; the periodic driver and alert
//! delivery live with the engine so this crate performs no I/O.

pub mod config;
pub mod monitor;
pub mod tracker;

pub use config::{SlaMatrix, SlaMatrixEntry, SlaTarget};
pub use monitor::{AlertEvent, AlertRecord, AlertType, ScanStats, SlaMonitor};
pub use tracker::{SlaCalculator, SlaTracking};
