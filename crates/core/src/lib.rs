//! # CapexFlow Core
//!
//! Port interfaces and pure services for CapexFlow.
//!
//! This crate contains:
//! - The [`sienge_ports::SiengeGateway`] trait the read-side depends on
//! - Financial statistics aggregation
//! - The [`time::Clock`] abstraction for deterministic time in tests
//!
//! ## Architecture
//! - Depends only on `capexflow-domain`
//! - No I/O; implementations live in `capexflow-infra`

pub mod sienge_ports;
pub mod stats;
pub mod time;

pub use sienge_ports::SiengeGateway;
pub use time::{Clock, MockClock, SystemClock};
