//! Lifecycle operation metrics regression tests

use super::helpers::*;
use crate::support::{shared, CallLog, Probe};
use lifeline::{
    Builder, Context, Kind, Metriced, MetricsLayer, ReconnectConfig, Resource, ResourceMetrics,
    Tracer,
};
use serial_test::serial;
use std::time::Duration;
use tower_layer::Layer;

#[tokio::test]
#[serial]
async fn operation_metrics_exist() {
    init_recorder();

    let log = CallLog::new();
    let probe = Probe::new("ops_basic", &log).with_kind(Kind::REDIS).shared();
    let resource = Metriced::new(shared(&probe), ResourceMetrics::default());

    let cx = Context::new();
    resource.connect(&cx).await.unwrap();
    resource.ping(&cx).await.unwrap();
    resource.close(&cx).await.unwrap();

    assert_counter_exists("resource_operations_total");
    assert_metric_has_label("resource_operations_total", "name", "ops_basic");
    assert_metric_has_label("resource_operations_total", "kind", "redis");
    assert_metric_has_label("resource_operations_total", "operation", "connect");
    assert_metric_has_label("resource_operations_total", "operation", "ping");
    assert_metric_has_label("resource_operations_total", "operation", "close");
    assert_metric_has_label("resource_operations_total", "outcome", "success");

    assert_histogram_exists("resource_operation_duration_seconds");
    assert_metric_has_label("resource_operation_duration_seconds", "name", "ops_basic");
    assert_metric_has_label("resource_operation_duration_seconds", "operation", "ping");
}

#[tokio::test]
#[serial]
async fn operation_outcome_label() {
    init_recorder();

    let log = CallLog::new();
    let probe = Probe::new("ops_outcome", &log).shared();
    let resource = Metriced::new(shared(&probe), ResourceMetrics::default());
    let cx = Context::new();

    // Not connected yet.
    assert!(resource.ping(&cx).await.is_err());
    resource.connect(&cx).await.unwrap();
    resource.ping(&cx).await.unwrap();
    resource.ping(&cx).await.unwrap();

    let ping = |outcome| {
        counter_value(
            "resource_operations_total",
            &[("name", "ops_outcome"), ("operation", "ping"), ("outcome", outcome)],
        )
    };
    assert_eq!(ping("error"), 1);
    assert_eq!(ping("success"), 2);
}

#[tokio::test]
#[serial]
async fn custom_subsystem_prefix() {
    init_recorder();

    let log = CallLog::new();
    let probe = Probe::new("ops_prefix", &log).shared();
    let metrics = ResourceMetrics::new("storage");
    assert_eq!(metrics.operations_total(), "storage_operations_total");
    assert_eq!(
        metrics.operation_duration_seconds(),
        "storage_operation_duration_seconds"
    );

    let resource = MetricsLayer::new(metrics).layer(shared(&probe));
    resource.connect(&Context::new()).await.unwrap();

    assert_counter_exists("storage_operations_total");
    assert_histogram_exists("storage_operation_duration_seconds");
    assert_metric_has_label("storage_operations_total", "name", "ops_prefix");
}

#[tokio::test]
#[serial]
async fn retried_connect_counts_once() {
    init_recorder();

    let log = CallLog::new();
    let probe = Probe::new("ops_retried", &log).failing(2).shared();
    let resource = Builder::new(shared(&probe))
        .with_reconnect(
            ReconnectConfig::builder()
                .max_retries(3)
                .initial_interval(Duration::from_millis(2))
                .build(),
        )
        .with_tracing(Tracer::default())
        .with_metrics(ResourceMetrics::default())
        .build();

    resource.connect(&Context::new()).await.unwrap();

    assert_eq!(probe.connects(), 3);
    let connects = |outcome| {
        counter_value(
            "resource_operations_total",
            &[("name", "ops_retried"), ("operation", "connect"), ("outcome", outcome)],
        )
    };
    assert_eq!(connects("success"), 1);
    assert_eq!(connects("error"), 0);
}
