//! Stress tests.
//!
//! - reconnect.rs: Concurrent pings racing repeated connection loss
//! - fleet.rs: Large fleets through the manager

mod fleet;
mod reconnect;
