use lifeline_core::{ResourceConfig, SharedResource};
use lifeline_reconnect::{ReconnectConfig, Reconnectable};
use lifeline_telemetry::{Metriced, ResourceMetrics, Traced, Tracer};
use std::sync::Arc;

/// Composes decorators around a resource.
///
/// The order in which the `with_*` methods are called does not matter:
/// [`build`](Self::build) always applies reconnect first, then tracing, then
/// metrics (outermost).
///
/// ```rust
/// # #[cfg(feature = "memory")]
/// # {
/// use lifeline::memory::MemoryStore;
/// use lifeline::{unwrap, Builder, ReconnectConfig, Tracer};
/// use std::sync::Arc;
///
/// let store: lifeline::SharedResource = Arc::new(MemoryStore::new("cache"));
/// let resource = Builder::new(Arc::clone(&store))
///     .with_tracing(Tracer::default())
///     .with_reconnect(ReconnectConfig::default())
///     .build();
///
/// assert!(Arc::ptr_eq(&unwrap(&resource), &store));
/// # }
/// ```
pub struct Builder {
    resource: SharedResource,
    reconnect: Option<ReconnectConfig>,
    tracer: Option<Tracer>,
    metrics: Option<ResourceMetrics>,
}

impl Builder {
    /// Starts from a concrete resource.
    pub fn new(resource: SharedResource) -> Self {
        Self {
            resource,
            reconnect: None,
            tracer: None,
            metrics: None,
        }
    }

    /// Requests a [`Reconnectable`] decorator.
    pub fn with_reconnect(mut self, config: ReconnectConfig) -> Self {
        self.reconnect = Some(config);
        self
    }

    /// Requests a [`Traced`] decorator.
    pub fn with_tracing(mut self, tracer: Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Requests a [`Metriced`] decorator.
    pub fn with_metrics(mut self, metrics: ResourceMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Requests the decorators enabled in an adapter's base configuration,
    /// with default settings. Decorators already requested are kept.
    pub fn with_config(mut self, config: &ResourceConfig) -> Self {
        if config.enable_tracing && self.tracer.is_none() {
            self.tracer = Some(Tracer::default());
        }
        if config.enable_metrics && self.metrics.is_none() {
            self.metrics = Some(ResourceMetrics::default());
        }
        self
    }

    /// Applies the requested decorators.
    pub fn build(self) -> SharedResource {
        let mut resource = self.resource;
        if let Some(config) = self.reconnect {
            resource = Arc::new(Reconnectable::new(resource, config));
        }
        if let Some(tracer) = self.tracer {
            resource = Arc::new(Traced::new(resource, tracer));
        }
        if let Some(metrics) = self.metrics {
            resource = Arc::new(Metriced::new(resource, metrics));
        }
        resource
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("resource", &self.resource.name())
            .field("reconnect", &self.reconnect)
            .field("tracer", &self.tracer)
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// Walks through every decorator down to the concrete resource.
///
/// Works for any decorator that reports what it wraps through
/// [`Resource::wrapped`](lifeline_core::Resource::wrapped), whatever the
/// nesting depth or order. A resource that is not decorated is returned as is.
pub fn unwrap(resource: &SharedResource) -> SharedResource {
    let mut current = Arc::clone(resource);
    loop {
        let next = match current.wrapped() {
            Some(inner) => Arc::clone(inner),
            None => return current,
        };
        current = next;
    }
}
