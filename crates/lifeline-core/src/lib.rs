//! Core contract for lifeline.
//!
//! This crate defines the small surface every backend adapter implements and
//! every decorator, builder and manager consumes:
//! - [`Resource`]: connect, ping, close, identity, kind and state
//! - [`StateMachine`]: an embeddable atomic connection state with a named CAS
//! - [`Context`]: cooperative cancellation and deadlines for lifecycle calls
//! - [`ResourceError`] and [`MultiError`]: the error taxonomy
//! - an event listener system shared by the decorators
//!
//! # Implementing a resource
//!
//! ```rust
//! use async_trait::async_trait;
//! use lifeline_core::{Context, Kind, Resource, ResourceError, State, StateMachine};
//!
//! struct Cache {
//!     machine: StateMachine,
//! }
//!
//! #[async_trait]
//! impl Resource for Cache {
//!     async fn connect(&self, _cx: &Context) -> Result<(), ResourceError> {
//!         let attempt = self.machine.begin_connect()?;
//!         // dial the backend here; returning early drops `attempt`,
//!         // which reverts to Disconnected
//!         attempt.commit();
//!         Ok(())
//!     }
//!
//!     async fn ping(&self, _cx: &Context) -> Result<(), ResourceError> {
//!         Ok(())
//!     }
//!
//!     async fn close(&self, _cx: &Context) -> Result<(), ResourceError> {
//!         if self.machine.begin_close() {
//!             self.machine.set_state(State::Disconnected);
//!         }
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         self.machine.name()
//!     }
//!
//!     fn kind(&self) -> &Kind {
//!         self.machine.kind()
//!     }
//!
//!     fn state(&self) -> State {
//!         self.machine.state()
//!     }
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod kind;
pub mod resource;
#[cfg(feature = "serde")]
pub mod serde_nanos;
pub mod state;

pub use config::{ResourceConfig, ResourceConfigBuilder};
pub use context::Context;
pub use error::{is_connection_error, BoxError, MultiError, ResourceError};
pub use events::{EventListener, EventListeners, LifecycleEvent};
pub use kind::Kind;
pub use resource::{Resource, SharedResource, Stats, StatsProvider};
pub use state::{ConnectGuard, State, StateMachine};
