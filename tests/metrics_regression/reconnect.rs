//! Reconnect metrics regression tests

use super::helpers::*;
use crate::support::{shared, CallLog, Probe};
use lifeline::{Context, ReconnectConfig, Reconnectable, Resource};
use serial_test::serial;
use std::time::Duration;

fn config() -> ReconnectConfig {
    ReconnectConfig::builder()
        .max_retries(2)
        .initial_interval(Duration::from_millis(2))
        .build()
}

#[tokio::test]
#[serial]
async fn reconnect_retry_metrics() {
    init_recorder();

    let log = CallLog::new();
    let probe = Probe::new("rc_retry", &log).failing(2).shared();
    let resource = Reconnectable::new(shared(&probe), config());
    resource.connect(&Context::new()).await.unwrap();

    assert_counter_exists("reconnect_retries_total");
    assert_eq!(
        counter_value("reconnect_retries_total", &[("resource", "rc_retry")]),
        2
    );
    assert_eq!(
        counter_value("reconnect_exhausted_total", &[("resource", "rc_retry")]),
        0
    );
}

#[tokio::test]
#[serial]
async fn reconnect_exhausted_metrics() {
    init_recorder();

    let log = CallLog::new();
    let probe = Probe::new("rc_exhausted", &log).failing(10).shared();
    let resource = Reconnectable::new(shared(&probe), config());
    assert!(resource.connect(&Context::new()).await.is_err());

    assert_counter_exists("reconnect_exhausted_total");
    assert_metric_has_label("reconnect_exhausted_total", "resource", "rc_exhausted");
    assert_eq!(
        counter_value("reconnect_retries_total", &[("resource", "rc_exhausted")]),
        2
    );
}

#[tokio::test]
#[serial]
async fn reconnect_on_ping_metrics() {
    init_recorder();

    let log = CallLog::new();
    let probe = Probe::new("rc_ping", &log).shared();
    let resource = Reconnectable::new(shared(&probe), config());
    resource.connect(&Context::new()).await.unwrap();

    probe.sever();
    resource.ping(&Context::new()).await.unwrap();

    assert_eq!(
        counter_value("reconnect_on_ping_total", &[("resource", "rc_ping")]),
        1
    );
}
