use crate::backoff::{normalize_multiplier, Backoff};
use crate::events::ReconnectEvent;
use lifeline_core::{EventListener, EventListeners, ResourceError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Decides whether a failure should trigger a reconnect.
pub type ReconnectPredicate = Arc<dyn Fn(&ResourceError) -> bool + Send + Sync>;

/// Configuration for the reconnect decorator.
///
/// Defaults: 5 retries, 1s initial interval, 30s max interval, multiplier 2.0.
/// A ping is considered recoverable when
/// [`ResourceError::is_connection_error`] says so, unless a custom predicate
/// is installed with [`ReconnectConfigBuilder::reconnect_on`].
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReconnectConfig {
    pub(crate) max_retries: u32,
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub(crate) initial_interval: Duration,
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub(crate) max_interval: Duration,
    pub(crate) multiplier: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) reconnect_predicate: Option<ReconnectPredicate>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) event_listeners: EventListeners<ReconnectEvent>,
}

impl ReconnectConfig {
    /// Creates a new builder.
    pub fn builder() -> ReconnectConfigBuilder {
        ReconnectConfigBuilder::new()
    }

    /// Retries after the first connect attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Wait before the first retry.
    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    /// Upper bound for any single wait.
    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// Growth factor between consecutive waits.
    pub fn multiplier(&self) -> f64 {
        normalize_multiplier(self.multiplier)
    }

    /// Starts a fresh backoff sequence.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_interval, self.max_interval, self.multiplier)
    }

    /// Returns `true` if `error` should trigger a reconnect.
    pub fn should_reconnect(&self, error: &ResourceError) -> bool {
        match &self.reconnect_predicate {
            Some(predicate) => predicate(error),
            None => error.is_connection_error(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
            multiplier: 2.0,
            reconnect_predicate: None,
            event_listeners: EventListeners::new(),
        }
    }
}

impl fmt::Debug for ReconnectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconnectConfig")
            .field("max_retries", &self.max_retries)
            .field("initial_interval", &self.initial_interval)
            .field("max_interval", &self.max_interval)
            .field("multiplier", &self.multiplier)
            .field("custom_predicate", &self.reconnect_predicate.is_some())
            .field("event_listeners", &self.event_listeners)
            .finish()
    }
}

/// Builder for [`ReconnectConfig`].
#[derive(Debug, Default)]
pub struct ReconnectConfigBuilder {
    config: ReconnectConfig,
}

impl ReconnectConfigBuilder {
    /// Creates a new builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of retries after the first attempt.
    ///
    /// `max_retries(2)` means at most 3 connect attempts.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Sets the wait before the first retry.
    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.config.initial_interval = interval;
        self
    }

    /// Sets the upper bound for any single wait.
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.config.max_interval = interval;
        self
    }

    /// Sets the growth factor between waits.
    ///
    /// Values that are not positive finite numbers fall back to 2.0.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.config.multiplier = multiplier;
        self
    }

    /// Replaces the connection-error heuristic used to decide whether a
    /// failed ping should trigger a reconnect.
    pub fn reconnect_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ResourceError) -> bool + Send + Sync + 'static,
    {
        self.config.reconnect_predicate = Some(Arc::new(predicate));
        self
    }

    /// Registers a listener for every reconnect event.
    pub fn on_event<L>(mut self, listener: L) -> Self
    where
        L: EventListener<ReconnectEvent> + 'static,
    {
        self.config.event_listeners.add(listener);
        self
    }

    /// Registers a callback invoked before each backoff wait.
    ///
    /// # Callback Signature
    /// `Fn(u32, Duration)`: the attempt that just failed (1-indexed) and the
    /// wait before the next one.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, Duration) + Send + Sync + 'static,
    {
        self.config
            .event_listeners
            .add(move |event: &ReconnectEvent| {
                if let ReconnectEvent::RetryScheduled { attempt, delay, .. } = event {
                    f(*attempt, *delay);
                }
            });
        self
    }

    /// Registers a callback invoked when a connect sequence gives up.
    ///
    /// Called with the total number of attempts made.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.config
            .event_listeners
            .add(move |event: &ReconnectEvent| {
                if let ReconnectEvent::Exhausted { attempts, .. } = event {
                    f(*attempts);
                }
            });
        self
    }

    /// Registers a callback invoked when a failed ping starts a reconnect.
    ///
    /// Called with the ping error message.
    pub fn on_reconnect<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config
            .event_listeners
            .add(move |event: &ReconnectEvent| {
                if let ReconnectEvent::ReconnectTriggered { cause, .. } = event {
                    f(cause);
                }
            });
        self
    }

    /// Builds the configuration.
    pub fn build(mut self) -> ReconnectConfig {
        self.config.multiplier = normalize_multiplier(self.config.multiplier);
        self.config
    }
}
