use crate::config::ReconnectConfig;
use crate::reconnectable::Reconnectable;
use lifeline_core::SharedResource;
use std::sync::Arc;
use tower_layer::Layer;

/// A [`Layer`] that wraps resources in a [`Reconnectable`].
///
/// The configuration, listeners included, is shared by every resource the
/// layer wraps.
///
/// # Examples
///
/// ```
/// use lifeline_reconnect::ReconnectLayer;
/// use std::time::Duration;
///
/// let layer = ReconnectLayer::builder()
///     .max_retries(3)
///     .initial_interval(Duration::from_millis(200))
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct ReconnectLayer {
    config: Arc<ReconnectConfig>,
}

impl ReconnectLayer {
    /// Creates a new `ReconnectLayer` with the given configuration.
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring a reconnect layer.
    pub fn builder() -> ReconnectLayerBuilder {
        ReconnectLayerBuilder {
            inner: ReconnectConfig::builder(),
        }
    }
}

impl Default for ReconnectLayer {
    fn default() -> Self {
        Self::new(ReconnectConfig::default())
    }
}

impl Layer<SharedResource> for ReconnectLayer {
    type Service = SharedResource;

    fn layer(&self, resource: SharedResource) -> Self::Service {
        Arc::new(Reconnectable::with_shared_config(
            resource,
            Arc::clone(&self.config),
        ))
    }
}

/// Builder producing a [`ReconnectLayer`] directly.
#[derive(Debug)]
pub struct ReconnectLayerBuilder {
    inner: crate::ReconnectConfigBuilder,
}

impl ReconnectLayerBuilder {
    /// See [`ReconnectConfigBuilder::max_retries`](crate::ReconnectConfigBuilder::max_retries).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.inner = self.inner.max_retries(max_retries);
        self
    }

    /// See [`ReconnectConfigBuilder::initial_interval`](crate::ReconnectConfigBuilder::initial_interval).
    pub fn initial_interval(mut self, interval: std::time::Duration) -> Self {
        self.inner = self.inner.initial_interval(interval);
        self
    }

    /// See [`ReconnectConfigBuilder::max_interval`](crate::ReconnectConfigBuilder::max_interval).
    pub fn max_interval(mut self, interval: std::time::Duration) -> Self {
        self.inner = self.inner.max_interval(interval);
        self
    }

    /// See [`ReconnectConfigBuilder::multiplier`](crate::ReconnectConfigBuilder::multiplier).
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.inner = self.inner.multiplier(multiplier);
        self
    }

    /// Builds the layer.
    pub fn build(self) -> ReconnectLayer {
        ReconnectLayer::new(self.inner.build())
    }
}
