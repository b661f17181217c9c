use lifeline_core::LifecycleEvent;
use std::time::{Duration, Instant};

/// Events emitted by the reconnect decorator.
#[derive(Debug, Clone)]
pub enum ReconnectEvent {
    /// A connect attempt failed and another one is scheduled after `delay`.
    RetryScheduled {
        resource: String,
        timestamp: Instant,
        attempt: u32,
        delay: Duration,
    },
    /// A connect sequence succeeded.
    Connected {
        resource: String,
        timestamp: Instant,
        attempts: u32,
    },
    /// A connect sequence gave up after `attempts` attempts.
    Exhausted {
        resource: String,
        timestamp: Instant,
        attempts: u32,
    },
    /// A ping failed with a connection error and a reconnect is starting.
    ReconnectTriggered {
        resource: String,
        timestamp: Instant,
        cause: String,
    },
    /// A concurrent caller already reconnected, so this one only re-pinged.
    ReconnectSkipped {
        resource: String,
        timestamp: Instant,
    },
}

impl ReconnectEvent {
    /// When the event was emitted.
    pub fn timestamp(&self) -> Instant {
        match self {
            ReconnectEvent::RetryScheduled { timestamp, .. }
            | ReconnectEvent::Connected { timestamp, .. }
            | ReconnectEvent::Exhausted { timestamp, .. }
            | ReconnectEvent::ReconnectTriggered { timestamp, .. }
            | ReconnectEvent::ReconnectSkipped { timestamp, .. } => *timestamp,
        }
    }
}

impl LifecycleEvent for ReconnectEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReconnectEvent::RetryScheduled { .. } => "retry_scheduled",
            ReconnectEvent::Connected { .. } => "connected",
            ReconnectEvent::Exhausted { .. } => "exhausted",
            ReconnectEvent::ReconnectTriggered { .. } => "reconnect_triggered",
            ReconnectEvent::ReconnectSkipped { .. } => "reconnect_skipped",
        }
    }

    fn resource_name(&self) -> &str {
        match self {
            ReconnectEvent::RetryScheduled { resource, .. }
            | ReconnectEvent::Connected { resource, .. }
            | ReconnectEvent::Exhausted { resource, .. }
            | ReconnectEvent::ReconnectTriggered { resource, .. }
            | ReconnectEvent::ReconnectSkipped { resource, .. } => resource,
        }
    }
}
