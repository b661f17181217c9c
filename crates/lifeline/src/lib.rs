//! Connection lifecycle and resilience for network-backed resources.
//!
//! Application code depends on one small contract, [`Resource`], instead of
//! each backend's native client. On top of it this crate provides:
//!
//! - **Reconnect**: bounded connect retries with exponential backoff and
//!   self-healing pings ([`Reconnectable`])
//! - **Telemetry**: spans ([`Traced`]) and operation metrics ([`Metriced`])
//!   around every lifecycle call, plus a pool stats collector
//! - **Composition**: a [`Builder`] that applies decorators in a fixed order,
//!   and [`unwrap`] to get back to the concrete resource
//! - **Fleet management**: a [`Manager`] that connects, health-checks and
//!   closes many resources at once
//!
//! # Decorator order
//!
//! [`Builder::build`] always wraps in this order, innermost first:
//!
//! ```text
//! Metriced( Traced( Reconnectable( resource ) ) )
//! ```
//!
//! Retries happen inside the span and metric boundary, so a connect that
//! needed three attempts shows up as one traced, one counted operation.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "memory")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use lifeline::memory::MemoryStore;
//! use lifeline::{Builder, Context, Manager, ReconnectConfig, ResourceMetrics, Tracer};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = Arc::new(MemoryStore::new("sessions"));
//! let resource = Builder::new(store)
//!     .with_reconnect(
//!         ReconnectConfig::builder()
//!             .max_retries(3)
//!             .initial_interval(Duration::from_millis(100))
//!             .build(),
//!     )
//!     .with_tracing(Tracer::default())
//!     .with_metrics(ResourceMetrics::default())
//!     .build();
//!
//! let manager = Manager::new();
//! manager.register(resource)?;
//!
//! let cx = Context::new();
//! manager.connect_all(&cx).await?;
//! let report = manager.health_check(&cx).await;
//! assert!(report[0].healthy);
//! manager.close_all(&cx).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `memory`: the in-process [`MemoryStore`](memory::MemoryStore) adapter
//! - `tracing`: debug events from the reconnect decorator and the manager
//! - `metrics`: reconnect retry counters
//! - `serde`: deserialize [`ReconnectConfig`] and [`ResourceConfig`]

mod builder;

pub use builder::{unwrap, Builder};

pub use lifeline_core as core;
pub use lifeline_manager as manager;
pub use lifeline_reconnect as reconnect;
pub use lifeline_telemetry as telemetry;

#[cfg(feature = "memory")]
pub use lifeline_memory as memory;

pub use lifeline_core::{
    is_connection_error, ConnectGuard, Context, Kind, MultiError, Resource, ResourceConfig,
    ResourceError, SharedResource, State, StateMachine, Stats, StatsProvider,
};
pub use lifeline_manager::{HealthStatus, Manager};
pub use lifeline_reconnect::{ReconnectConfig, ReconnectLayer, Reconnectable};
pub use lifeline_telemetry::{
    Metriced, MetricsLayer, PoolMetrics, ResourceMetrics, StatsCollector, Traced, Tracer,
    TracingLayer,
};
