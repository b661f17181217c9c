use chrono::{DateTime, Utc};
use lifeline_core::{Context, Kind, SharedResource, State, Stats};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Result of one liveness probe.
///
/// Always produced fresh by [`Manager::health_check`](crate::Manager::health_check).
/// Serializes with `latency` and `stats.wait_duration` in nanoseconds and
/// `checked_at` in RFC 3339. `error` and `stats` are omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    /// Registration name.
    pub name: String,
    /// Resource family.
    pub kind: Kind,
    /// State observed after the probe.
    pub state: State,
    /// Whether the ping succeeded.
    pub healthy: bool,
    /// Time the ping took.
    #[serde(with = "lifeline_core::serde_nanos")]
    pub latency: Duration,
    /// Ping failure, when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Pool statistics, for resources that expose them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    /// When the probe started.
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    /// Pings `resource` under `cx` and reports the outcome.
    pub async fn probe(resource: &SharedResource, cx: &Context) -> Self {
        let checked_at = Utc::now();
        let start = Instant::now();
        let result = cx.run(resource.ping(cx)).await;
        let latency = start.elapsed();

        Self {
            name: resource.name().to_string(),
            kind: resource.kind().clone(),
            state: resource.state(),
            healthy: result.is_ok(),
            latency,
            error: result.err().map(|err| err.to_string()),
            stats: resource.as_stats().map(|provider| provider.stats()),
            checked_at,
        }
    }

    /// An unhealthy status for a probe that never reported.
    pub(crate) fn lost(resource: &SharedResource, reason: impl Into<String>) -> Self {
        Self {
            name: resource.name().to_string(),
            kind: resource.kind().clone(),
            state: resource.state(),
            healthy: false,
            latency: Duration::ZERO,
            error: Some(reason.into()),
            stats: None,
            checked_at: Utc::now(),
        }
    }
}
