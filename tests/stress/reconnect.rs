//! Reconnect stress tests

use crate::support::{shared, CallLog, Probe};
use lifeline::{Context, ReconnectConfig, Reconnectable, Resource, State};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Test: Many tasks pinging while the connection keeps dropping
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_concurrent_pings_with_repeated_loss() {
    let log = CallLog::new();
    let probe = Probe::new("db", &log)
        .with_connect_delay(Duration::from_millis(1))
        .shared();
    let resource = Arc::new(Reconnectable::new(
        shared(&probe),
        ReconnectConfig::builder()
            .max_retries(5)
            .initial_interval(Duration::from_millis(1))
            .build(),
    ));
    resource.connect(&Context::new()).await.unwrap();

    let start = Instant::now();
    let mut tasks = Vec::new();
    for _ in 0..64 {
        let resource = Arc::clone(&resource);
        tasks.push(tokio::spawn(async move {
            let cx = Context::new();
            let mut ok = 0usize;
            for _ in 0..500 {
                if resource.ping(&cx).await.is_ok() {
                    ok += 1;
                }
            }
            ok
        }));
    }

    let severer = {
        let probe = Arc::clone(&probe);
        tokio::spawn(async move {
            for _ in 0..50 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                probe.sever();
            }
        })
    };

    let mut ok = 0;
    for task in tasks {
        ok += task.await.unwrap();
    }
    severer.await.unwrap();

    println!("64 x 500 pings with 50 losses completed in {:?}", start.elapsed());
    println!("Successful pings: {ok}, connects: {}", probe.connects());

    // Every loss needs at most one reconnect; pings racing a reconnect may
    // still observe a not-connected resource.
    assert!(probe.connects() <= 1 + 50 * 6);
    resource.ping(&Context::new()).await.unwrap();
    assert_eq!(resource.state(), State::Connected);
}
