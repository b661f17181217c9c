//! Fleet stress tests

use crate::support::{shared, CallLog, Probe};
use lifeline::{Builder, Context, Manager, ReconnectConfig, Tracer};
use std::time::{Duration, Instant};

/// Test: Connect, check and close a thousand resources
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_thousand_resource_fleet() {
    let log = CallLog::new();
    let manager = Manager::new();
    for i in 0..1_000 {
        let probe = Probe::new(&format!("r{i}"), &log)
            .failing((i % 3) as u32)
            .with_connect_delay(Duration::from_millis(5))
            .shared();
        let resource = Builder::new(shared(&probe))
            .with_reconnect(
                ReconnectConfig::builder()
                    .max_retries(3)
                    .initial_interval(Duration::from_millis(1))
                    .build(),
            )
            .with_tracing(Tracer::default())
            .build();
        manager.register(resource).unwrap();
    }

    let cx = Context::new();
    let start = Instant::now();
    manager.connect_all(&cx).await.unwrap();
    println!("connect_all over 1000 resources: {:?}", start.elapsed());

    let start = Instant::now();
    let report = manager.health_check(&cx).await;
    println!("health_check over 1000 resources: {:?}", start.elapsed());
    assert_eq!(report.len(), 1_000);
    assert!(report.iter().all(|status| status.healthy));

    manager.close_all(&cx).await.unwrap();
    let closes = log.filtered("close:");
    assert_eq!(closes.len(), 1_000);
    assert_eq!(closes.first().map(String::as_str), Some("close:r999"));
    assert_eq!(closes.last().map(String::as_str), Some("close:r0"));
}
