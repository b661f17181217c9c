//! In-process key/value resource implementing the lifeline contract.
//!
//! [`MemoryStore`] behaves like a networked store without a network: it has a
//! connection handle that can be established, broken and closed, and it
//! follows the [`Resource`](lifeline_core::Resource) contract to the letter.
//! It also carries fault-injection knobs, which makes it the reference
//! adapter for exercising decorators and the manager.
//!
//! ```rust
//! use lifeline_core::{Context, Resource, State};
//! use lifeline_memory::MemoryStore;
//!
//! # async fn example() -> Result<(), lifeline_core::ResourceError> {
//! let store = MemoryStore::new("sessions");
//! let cx = Context::new();
//!
//! store.connect(&cx).await?;
//! store.set("user:1", "alice")?;
//! assert_eq!(store.get("user:1")?, Some(b"alice".to_vec()));
//!
//! store.close(&cx).await?;
//! assert_eq!(store.state(), State::Disconnected);
//! # Ok(())
//! # }
//! ```

mod store;

pub use store::MemoryStore;
