use crate::backoff::normalize_multiplier;
use crate::config::ReconnectConfig;
use crate::events::ReconnectEvent;
use async_trait::async_trait;
use lifeline_core::{Context, Kind, Resource, ResourceError, SharedResource, State, StatsProvider};
#[cfg(feature = "metrics")]
use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// A resource decorated with connect retries and self-healing pings.
///
/// `connect` makes up to `max_retries + 1` attempts, sleeping between them
/// according to the configured [`Backoff`](crate::Backoff). Sleeps end early
/// when the context is cancelled, and the context error is returned as is.
///
/// `ping` reconnects when the inner ping fails with an error the config
/// classifies as recoverable. Concurrent pings that fail together trigger a
/// single reconnect: the others wait for it and ping again.
pub struct Reconnectable {
    inner: SharedResource,
    config: Arc<ReconnectConfig>,
    reconnect_lock: Mutex<()>,
    // Bumped after every successful reconnect-on-ping.
    generation: AtomicU64,
}

impl Reconnectable {
    /// Wraps `inner` with the given configuration.
    pub fn new(inner: SharedResource, config: ReconnectConfig) -> Self {
        Self::with_shared_config(inner, Arc::new(config))
    }

    pub(crate) fn with_shared_config(inner: SharedResource, config: Arc<ReconnectConfig>) -> Self {
        let config = if config.multiplier == normalize_multiplier(config.multiplier) {
            config
        } else {
            let mut fixed = (*config).clone();
            fixed.multiplier = normalize_multiplier(fixed.multiplier);
            Arc::new(fixed)
        };
        Self {
            inner,
            config,
            reconnect_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the wrapped resource.
    pub fn get_ref(&self) -> &SharedResource {
        &self.inner
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &ReconnectConfig {
        &self.config
    }

    async fn connect_with_retry(&self, cx: &Context) -> Result<(), ResourceError> {
        let mut backoff = self.config.backoff();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let err = match self.inner.connect(cx).await {
                Ok(()) => {
                    self.config.event_listeners.emit(&ReconnectEvent::Connected {
                        resource: self.name().to_string(),
                        timestamp: Instant::now(),
                        attempts,
                    });
                    return Ok(());
                }
                Err(err) => err,
            };

            // Misuse and caller cancellation are never retried.
            if err.is_invalid_state() || err.is_context_error() {
                return Err(err);
            }

            if attempts > self.config.max_retries {
                self.config.event_listeners.emit(&ReconnectEvent::Exhausted {
                    resource: self.name().to_string(),
                    timestamp: Instant::now(),
                    attempts,
                });

                #[cfg(feature = "metrics")]
                counter!("reconnect_exhausted_total", "resource" => self.name().to_string())
                    .increment(1);

                return Err(ResourceError::RetryExhausted {
                    attempts,
                    source: Box::new(err),
                });
            }

            let delay = backoff.next_delay();
            self.config
                .event_listeners
                .emit(&ReconnectEvent::RetryScheduled {
                    resource: self.name().to_string(),
                    timestamp: Instant::now(),
                    attempt: attempts,
                    delay,
                });

            #[cfg(feature = "tracing")]
            tracing::debug!(
                resource = self.name(),
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "connect failed, retrying"
            );

            #[cfg(feature = "metrics")]
            counter!("reconnect_retries_total", "resource" => self.name().to_string())
                .increment(1);

            cx.sleep(delay).await?;
        }
    }

    async fn reconnect(
        &self,
        cx: &Context,
        observed: u64,
        cause: ResourceError,
    ) -> Result<(), ResourceError> {
        let _guard = cx
            .run(async { Ok::<_, ResourceError>(self.reconnect_lock.lock().await) })
            .await?;

        if self.generation.load(Ordering::Acquire) != observed {
            self.config
                .event_listeners
                .emit(&ReconnectEvent::ReconnectSkipped {
                    resource: self.name().to_string(),
                    timestamp: Instant::now(),
                });
            return Ok(());
        }

        self.config
            .event_listeners
            .emit(&ReconnectEvent::ReconnectTriggered {
                resource: self.name().to_string(),
                timestamp: Instant::now(),
                cause: cause.to_string(),
            });

        #[cfg(feature = "tracing")]
        tracing::debug!(resource = self.name(), error = %cause, "ping failed, reconnecting");

        #[cfg(feature = "metrics")]
        counter!("reconnect_on_ping_total", "resource" => self.name().to_string()).increment(1);

        // The old handle is already broken, so a failing close is expected.
        let _ = self.inner.close(cx).await;

        match self.connect_with_retry(cx).await {
            Ok(()) => {
                self.generation.fetch_add(1, Ordering::AcqRel);
                Ok(())
            }
            Err(err) if err.is_context_error() => Err(err),
            Err(err) => Err(ResourceError::ReconnectFailed {
                source: Box::new(err),
            }),
        }
    }
}

#[async_trait]
impl Resource for Reconnectable {
    async fn connect(&self, cx: &Context) -> Result<(), ResourceError> {
        self.connect_with_retry(cx).await
    }

    async fn ping(&self, cx: &Context) -> Result<(), ResourceError> {
        let observed = self.generation.load(Ordering::Acquire);
        let err = match self.inner.ping(cx).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        if !self.config.should_reconnect(&err) {
            return Err(err);
        }

        self.reconnect(cx, observed, err).await?;
        self.inner.ping(cx).await
    }

    async fn close(&self, cx: &Context) -> Result<(), ResourceError> {
        self.inner.close(cx).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> &Kind {
        self.inner.kind()
    }

    fn state(&self) -> State {
        self.inner.state()
    }

    fn as_stats(&self) -> Option<&dyn StatsProvider> {
        self.inner.as_stats()
    }

    fn wrapped(&self) -> Option<&SharedResource> {
        Some(&self.inner)
    }
}

impl std::fmt::Debug for Reconnectable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconnectable")
            .field("name", &self.inner.name())
            .field("config", &self.config)
            .finish()
    }
}
