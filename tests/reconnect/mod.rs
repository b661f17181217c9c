//! Tests for the reconnect decorator.
//!
//! Test organization:
//! - connect.rs: Bounded connect retries and backoff timing
//! - ping.rs: Self-healing pings and concurrent reconnects
//! - events.rs: Listener callbacks
