//! Fleet registry for lifeline resources.
//!
//! A [`Manager`] holds named resources in registration order and runs
//! lifecycle operations across all of them:
//!
//! - [`connect_all`](Manager::connect_all) connects every resource
//!   concurrently and reports every failure, not just the first.
//! - [`health_check`](Manager::health_check) pings every resource
//!   concurrently and returns one [`HealthStatus`] per resource, in
//!   registration order.
//! - [`close_all`](Manager::close_all) closes resources one at a time in
//!   reverse registration order, so resources registered later (which may
//!   depend on earlier ones) go first.
//!
//! # Examples
//!
//! ```rust
//! use lifeline_core::Context;
//! use lifeline_manager::Manager;
//! use lifeline_memory::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = Manager::new();
//! manager.register(Arc::new(MemoryStore::new("primary")))?;
//! manager.register(Arc::new(MemoryStore::new("cache")))?;
//!
//! let cx = Context::new();
//! manager.connect_all(&cx).await?;
//!
//! for status in manager.health_check(&cx).await {
//!     println!("{}: healthy={}", status.name, status.healthy);
//! }
//!
//! manager.close_all(&cx).await?;
//! # Ok(())
//! # }
//! ```

mod health;
mod manager;

pub use health::HealthStatus;
pub use manager::Manager;
