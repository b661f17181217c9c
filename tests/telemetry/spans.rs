use super::capture::SpanCapture;
use crate::support::{shared, CallLog, Probe};
use lifeline::{Context, Kind, Resource, Traced, Tracer, TracingLayer};
use tower_layer::Layer;

#[tokio::test]
async fn test_connect_span_fields() {
    let (capture, _guard) = SpanCapture::install();
    let log = CallLog::new();
    let probe = Probe::new("orders", &log).with_kind(Kind::POSTGRESQL).shared();
    let resource = Traced::new(shared(&probe), Tracer::default());

    resource.connect(&Context::new()).await.unwrap();

    let spans = capture.named("resource.connect");
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.field("resource.name"), Some("orders"));
    assert_eq!(span.field("resource.kind"), Some("postgresql"));
    assert_eq!(span.field("otel.name"), Some("resource.connect"));
    assert_eq!(span.field("otel.kind"), Some("client"));
    assert_eq!(span.field("otel.status_code"), Some("ok"));
    assert_eq!(span.field("error"), None);
    assert!(span.events.is_empty());
}

#[tokio::test]
async fn test_failed_ping_marks_span_as_error() {
    let (capture, _guard) = SpanCapture::install();
    let log = CallLog::new();
    let probe = Probe::new("orders", &log).shared();
    let resource = Traced::new(shared(&probe), Tracer::new("billing"));

    let err = resource.ping(&Context::new()).await.unwrap_err();

    let spans = capture.named("resource.ping");
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.field("otel.name"), Some("billing.ping"));
    assert_eq!(span.field("otel.status_code"), Some("error"));
    assert_eq!(span.field("error"), Some(err.to_string().as_str()));
    assert_eq!(span.events, vec!["DEBUG resource operation failed"]);
}

#[tokio::test]
async fn test_one_span_per_call() {
    let (capture, _guard) = SpanCapture::install();
    let log = CallLog::new();
    let probe = Probe::new("orders", &log).shared();
    let resource = TracingLayer::new(Tracer::default()).layer(shared(&probe));

    let cx = Context::new();
    resource.connect(&cx).await.unwrap();
    resource.ping(&cx).await.unwrap();
    resource.ping(&cx).await.unwrap();
    resource.close(&cx).await.unwrap();

    let names: Vec<_> = capture.spans().iter().map(|span| span.name).collect();
    assert_eq!(
        names,
        vec![
            "resource.connect",
            "resource.ping",
            "resource.ping",
            "resource.close"
        ]
    );
}

#[tokio::test]
async fn test_traced_is_transparent() {
    let (_capture, _guard) = SpanCapture::install();
    let log = CallLog::new();
    let probe = Probe::new("orders", &log).with_kind(Kind::REDIS).shared();
    let resource = Traced::new(shared(&probe), Tracer::default());

    assert_eq!(resource.name(), "orders");
    assert_eq!(resource.kind(), &Kind::REDIS);
    resource.connect(&Context::new()).await.unwrap();
    assert_eq!(resource.state(), probe.state());
    assert_eq!(log.entries(), vec!["connect:orders"]);
}
