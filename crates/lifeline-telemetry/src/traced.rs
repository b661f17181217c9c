use crate::operation::Operation;
use async_trait::async_trait;
use lifeline_core::{Context, Kind, Resource, ResourceError, SharedResource, State, StatsProvider};
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use tower_layer::Layer;
use tracing::field::{display, Empty};
use tracing::{Instrument, Span};

macro_rules! lifecycle_span {
    ($name:literal, $resource:expr, $kind:expr, $otel_name:expr) => {
        tracing::info_span!(
            $name,
            resource.name = %$resource,
            resource.kind = %$kind,
            otel.name = %$otel_name,
            otel.kind = "client",
            otel.status_code = Empty,
            error = Empty,
        )
    };
}

/// Creates the spans used by [`Traced`].
///
/// Span names are fixed (`resource.connect`, `resource.ping`,
/// `resource.close`). The prefix goes into the `otel.name` field, so an
/// exporter shows `"<prefix>.<operation>"`.
#[derive(Debug, Clone)]
pub struct Tracer {
    prefix: Cow<'static, str>,
}

impl Tracer {
    /// Creates a tracer with the given `otel.name` prefix.
    pub fn new(prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The `otel.name` prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Opens a span for `operation` on the named resource.
    pub fn span(&self, operation: Operation, name: &str, kind: &Kind) -> Span {
        let otel_name = format!("{}.{}", self.prefix, operation);
        match operation {
            Operation::Connect => lifecycle_span!("resource.connect", name, kind, otel_name),
            Operation::Ping => lifecycle_span!("resource.ping", name, kind, otel_name),
            Operation::Close => lifecycle_span!("resource.close", name, kind, otel_name),
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new("resource")
    }
}

/// A resource whose lifecycle calls each run inside a tracing span.
///
/// `name`, `kind` and `state` are not traced.
pub struct Traced {
    inner: SharedResource,
    tracer: Tracer,
}

impl Traced {
    /// Wraps `inner`.
    pub fn new(inner: SharedResource, tracer: Tracer) -> Self {
        Self { inner, tracer }
    }

    /// Returns the wrapped resource.
    pub fn get_ref(&self) -> &SharedResource {
        &self.inner
    }

    async fn observe<F>(&self, operation: Operation, call: F) -> Result<(), ResourceError>
    where
        F: Future<Output = Result<(), ResourceError>>,
    {
        let span = self
            .tracer
            .span(operation, self.inner.name(), self.inner.kind());
        let result = call.instrument(span.clone()).await;

        match &result {
            Ok(()) => {
                span.record("otel.status_code", "ok");
            }
            Err(err) => {
                span.record("otel.status_code", "error");
                span.record("error", display(err));
                span.in_scope(|| {
                    tracing::debug!(
                        operation = operation.as_str(),
                        error = %err,
                        "resource operation failed"
                    );
                });
            }
        }
        result
    }
}

#[async_trait]
impl Resource for Traced {
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

impl std::fmt::Debug for Traced {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Traced")
            .field("name", &self.inner.name())
            .field("tracer", &self.tracer)
            .finish()
    }
}

/// A [`Layer`] that wraps resources in [`Traced`].
#[derive(Debug, Clone, Default)]
pub struct TracingLayer {
    tracer: Tracer,
}

impl TracingLayer {
    /// Creates a layer using `tracer`.
    pub fn new(tracer: Tracer) -> Self {
        Self { tracer }
    }
}

impl Layer<SharedResource> for TracingLayer {
    type Service = SharedResource;

    fn layer(&self, resource: SharedResource) -> Self::Service {
        Arc::new(Traced::new(resource, self.tracer.clone()))
    }
}
