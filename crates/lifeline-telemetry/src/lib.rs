//! Tracing and metrics decorators for lifeline resources.
//!
//! - [`Traced`] opens a span around `connect`, `ping` and `close`, tagged with
//!   the resource name and kind, and marks it `ok` or `error`.
//! - [`Metriced`] counts every operation by outcome and records its duration.
//! - [`StatsCollector`] periodically publishes pool statistics of resources
//!   that expose them as gauges.
//!
//! Both decorators delegate everything else to the wrapped resource and
//! return its errors unchanged.
//!
//! ## Metric names
//!
//! With the default `resource` subsystem:
//!
//! | Metric | Type | Labels |
//! |---|---|---|
//! | `resource_operations_total` | counter | `name`, `kind`, `operation`, `outcome` |
//! | `resource_operation_duration_seconds` | histogram | `name`, `kind`, `operation` |
//! | `resource_pool_max_open` | gauge | `name`, `kind` |
//! | `resource_pool_open` | gauge | `name`, `kind` |
//! | `resource_pool_in_use` | gauge | `name`, `kind` |
//! | `resource_pool_idle` | gauge | `name`, `kind` |
//! | `resource_pool_wait_total` | counter | `name`, `kind` |
//! | `resource_pool_wait_duration_seconds` | gauge | `name`, `kind` |
//!
//! # Examples
//!
//! ```rust
//! use lifeline_core::SharedResource;
//! use lifeline_memory::MemoryStore;
//! use lifeline_telemetry::{Metriced, ResourceMetrics, Traced, Tracer};
//! use std::sync::Arc;
//!
//! let store: SharedResource = Arc::new(MemoryStore::new("sessions"));
//! let traced: SharedResource = Arc::new(Traced::new(store, Tracer::default()));
//! let observed = Metriced::new(traced, ResourceMetrics::default());
//! ```

mod collector;
mod metered;
mod operation;
mod traced;

pub use collector::{PoolMetrics, StatsCollector, DEFAULT_COLLECT_INTERVAL};
pub use metered::{Metriced, MetricsLayer, ResourceMetrics};
pub use operation::Operation;
pub use traced::{Traced, Tracer, TracingLayer};
