//! The resource contract.

use crate::context::Context;
use crate::error::ResourceError;
use crate::kind::Kind;
use crate::state::State;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A resource shared between decorators, builders and the manager.
pub type SharedResource = Arc<dyn Resource>;

/// The minimal capability set every backend adapter implements.
///
/// # Contract
///
/// - `connect` succeeds only from [`State::Disconnected`]. Implementations
///   claim the slot with [`StateMachine::begin_connect`](crate::StateMachine::begin_connect)
///   and fail fast, without I/O, when the CAS fails. On I/O failure the state
///   must go back to `Disconnected`. Callers may drop a connect future at any
///   await point (a health check deadline does), so the returned
///   [`ConnectGuard`](crate::ConnectGuard) is held until the handle is live and
///   then committed; dropping it reverts the state.
/// - `ping` fails with [`ResourceError::NotConnected`] when there is no live
///   handle, whatever `state()` reports.
/// - `close` moves `Connected`/`Connecting -> Disconnecting -> Disconnected`
///   and is a no-op on an unconnected resource.
///
/// Decorators implement the same trait by delegation and report the resource
/// they wrap through [`wrapped`](Self::wrapped).
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Establishes the connection.
    async fn connect(&self, cx: &Context) -> Result<(), ResourceError>;

    /// Probes liveness.
    async fn ping(&self, cx: &Context) -> Result<(), ResourceError>;

    /// Tears the connection down.
    async fn close(&self, cx: &Context) -> Result<(), ResourceError>;

    /// Fleet-unique name.
    fn name(&self) -> &str;

    /// Resource family.
    fn kind(&self) -> &Kind;

    /// Current connection state.
    fn state(&self) -> State;

    /// Connection pool statistics, for resources that can supply them.
    fn as_stats(&self) -> Option<&dyn StatsProvider> {
        None
    }

    /// The resource this one decorates, if it is a decorator.
    fn wrapped(&self) -> Option<&SharedResource> {
        None
    }
}

/// Supplies a read-only snapshot of connection pool statistics.
pub trait StatsProvider: Send + Sync {
    /// Takes a snapshot.
    fn stats(&self) -> Stats;
}

/// Connection pool statistics snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Stats {
    /// Configured upper bound of open connections.
    pub max_open_connections: u64,
    /// Connections currently open.
    pub open_connections: u64,
    /// Open connections currently handed out.
    pub in_use: u64,
    /// Open connections sitting idle.
    pub idle: u64,
    /// Total number of times a caller waited for a connection.
    pub wait_count: u64,
    /// Total time spent waiting for connections.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_nanos"))]
    pub wait_duration: Duration,
}
