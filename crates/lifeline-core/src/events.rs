//! Typed events and the listener fan-out the decorators emit them through.
//!
//! Decorators never log on their own. They describe what they did as an
//! event and hand it to whatever listeners the caller registered on the
//! decorator's config.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// An event about a single resource.
pub trait LifecycleEvent: fmt::Debug + Send + Sync {
    /// Snake-case label, e.g. `retry_scheduled`.
    fn event_type(&self) -> &'static str;

    /// Name of the resource the event is about.
    fn resource_name(&self) -> &str;
}

/// Receives events of type `E`.
///
/// Any `Fn(&E) + Send + Sync` closure is a listener.
pub trait EventListener<E>: Send + Sync {
    fn on_event(&self, event: &E);
}

impl<E, F> EventListener<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        self(event)
    }
}

/// Listeners registered on a decorator config.
///
/// Clones share the registered listeners.
pub struct EventListeners<E> {
    listeners: Vec<Arc<dyn EventListener<E>>>,
}

impl<E: LifecycleEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers `listener` after the existing ones.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// A listener that panics is skipped and the rest still run. Returns how
    /// many listeners panicked.
    pub fn emit(&self, event: &E) -> usize {
        self.listeners
            .iter()
            .filter(|listener| {
                catch_unwind(AssertUnwindSafe(|| listener.on_event(event))).is_err()
            })
            .count()
    }
}

impl<E: LifecycleEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<E> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventListeners({})", self.listeners.len())
    }
}
