//! Reconnect-with-backoff decorator for lifeline resources.
//!
//! [`Reconnectable`] wraps any [`Resource`](lifeline_core::Resource) and:
//!
//! - turns a single connect attempt into a bounded sequence with exponential
//!   backoff (`max_retries + 1` attempts in total),
//! - makes `ping` self-healing: a ping failing with a connection error closes
//!   the inner resource, reconnects with the same backoff and pings once more.
//!
//! Errors that are not classified as connection errors are returned untouched,
//! so an authorization failure is never masked as a transient one.
//!
//! # Examples
//!
//! ```rust
//! use lifeline_reconnect::{ReconnectConfig, ReconnectLayer};
//! use std::time::Duration;
//!
//! let config = ReconnectConfig::builder()
//!     .max_retries(3)
//!     .initial_interval(Duration::from_millis(100))
//!     .max_interval(Duration::from_secs(5))
//!     .on_retry(|attempt, delay| {
//!         println!("retry {} in {:?}", attempt, delay);
//!     })
//!     .build();
//!
//! let layer = ReconnectLayer::new(config);
//! ```

mod backoff;
mod config;
mod events;
mod layer;
mod reconnectable;

pub use backoff::Backoff;
pub use config::{ReconnectConfig, ReconnectConfigBuilder, ReconnectPredicate};
pub use events::ReconnectEvent;
pub use layer::{ReconnectLayer, ReconnectLayerBuilder};
pub use reconnectable::Reconnectable;
