use crate::operation::{outcome, Operation};
use async_trait::async_trait;
use lifeline_core::{Context, Kind, Resource, ResourceError, SharedResource, State, StatsProvider};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_layer::Layer;

/// Metric names for lifecycle operations.
///
/// `ResourceMetrics::new("cache")` records `cache_operations_total` and
/// `cache_operation_duration_seconds`.
#[derive(Debug, Clone)]
pub struct ResourceMetrics {
    operations_total: String,
    operation_duration_seconds: String,
}

impl ResourceMetrics {
    /// Creates the metric names for `subsystem` and describes them to the
    /// installed recorder.
    pub fn new(subsystem: &str) -> Self {
        let metrics = Self {
            operations_total: format!("{subsystem}_operations_total"),
            operation_duration_seconds: format!("{subsystem}_operation_duration_seconds"),
        };
        describe_counter!(
            metrics.operations_total.clone(),
            "Total number of resource lifecycle operations"
        );
        describe_histogram!(
            metrics.operation_duration_seconds.clone(),
            metrics::Unit::Seconds,
            "Duration of resource lifecycle operations"
        );
        metrics
    }

    /// Name of the operation counter.
    pub fn operations_total(&self) -> &str {
        &self.operations_total
    }

    /// Name of the duration histogram.
    pub fn operation_duration_seconds(&self) -> &str {
        &self.operation_duration_seconds
    }

    /// Records one finished operation.
    pub fn record(
        &self,
        name: &str,
        kind: &Kind,
        operation: Operation,
        outcome: &'static str,
        elapsed: Duration,
    ) {
        counter!(
            self.operations_total.clone(),
            "name" => name.to_string(),
            "kind" => kind.as_str().to_string(),
            "operation" => operation.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        histogram!(
            self.operation_duration_seconds.clone(),
            "name" => name.to_string(),
            "kind" => kind.as_str().to_string(),
            "operation" => operation.as_str()
        )
        .record(elapsed.as_secs_f64());
    }
}

impl Default for ResourceMetrics {
    fn default() -> Self {
        Self::new("resource")
    }
}

/// A resource whose lifecycle calls are counted and timed.
pub struct Metriced {
    inner: SharedResource,
    metrics: ResourceMetrics,
}

impl Metriced {
    /// Wraps `inner`.
    pub fn new(inner: SharedResource, metrics: ResourceMetrics) -> Self {
        Self { inner, metrics }
    }

    /// Returns the wrapped resource.
    pub fn get_ref(&self) -> &SharedResource {
        &self.inner
    }

    async fn observe<F>(&self, operation: Operation, call: F) -> Result<(), ResourceError>
    where
        F: Future<Output = Result<(), ResourceError>>,
    {
        let start = Instant::now();
        let result = call.await;
        self.metrics.record(
            self.inner.name(),
            self.inner.kind(),
            operation,
            outcome(&result),
            start.elapsed(),
        );
        result
    }
}

#[async_trait]
impl Resource for Metriced {
    async fn connect(&self, cx: &Context) -> Result<(), ResourceError> {
        self.observe(Operation::Connect, self.inner.connect(cx)).await
    }

    async fn ping(&self, cx: &Context) -> Result<(), ResourceError> {
        self.observe(Operation::Ping, self.inner.ping(cx)).await
    }

    async fn close(&self, cx: &Context) -> Result<(), ResourceError> {
        self.observe(Operation::Close, self.inner.close(cx)).await
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

impl std::fmt::Debug for Metriced {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metriced")
            .field("name", &self.inner.name())
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// A [`Layer`] that wraps resources in [`Metriced`].
#[derive(Debug, Clone, Default)]
pub struct MetricsLayer {
    metrics: ResourceMetrics,
}

impl MetricsLayer {
    /// Creates a layer recording into `metrics`.
    pub fn new(metrics: ResourceMetrics) -> Self {
        Self { metrics }
    }
}

impl Layer<SharedResource> for MetricsLayer {
    type Service = SharedResource;

    fn layer(&self, resource: SharedResource) -> Self::Service {
        Arc::new(Metriced::new(resource, self.metrics.clone()))
    }
}
