use crate::support::{shared, CallLog, Probe};
use lifeline::{Builder, Context, Manager, ReconnectConfig, Resource, ResourceError, State};
use std::time::Duration;

fn fleet(log: &CallLog, names: &[&str]) -> Manager {
    let manager = Manager::new();
    for name in names {
        manager
            .register(shared(&Probe::new(name, log).shared()))
            .unwrap();
    }
    manager
}

#[tokio::test]
async fn test_connect_all_connects_everything() {
    let log = CallLog::new();
    let manager = fleet(&log, &["a", "b", "c"]);

    manager.connect_all(&Context::new()).await.unwrap();

    for name in ["a", "b", "c"] {
        assert_eq!(manager.must_get(name).state(), State::Connected);
    }
    let mut connects = log.filtered("connect:");
    connects.sort();
    assert_eq!(connects, vec!["connect:a", "connect:b", "connect:c"]);
}

#[tokio::test]
async fn test_connect_all_reports_every_failure() {
    let log = CallLog::new();
    let manager = Manager::new();
    let good = Probe::new("good", &log).shared();
    manager.register(shared(&good)).unwrap();
    manager
        .register(shared(
            &Probe::new("db", &log).broken("access denied").shared(),
        ))
        .unwrap();
    manager
        .register(shared(
            &Probe::new("queue", &log).broken("no such host").shared(),
        ))
        .unwrap();

    let errors = manager.connect_all(&Context::new()).await.unwrap_err();

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.get("db").unwrap().to_string(), "db: access denied");
    assert_eq!(errors.get("queue").unwrap().to_string(), "queue: no such host");
    assert!(errors.get("good").is_none());
    assert!(errors.to_string().contains("access denied"));
    assert!(errors.to_string().contains("no such host"));

    // Successful resources stay connected.
    assert_eq!(good.state(), State::Connected);
}

#[tokio::test]
async fn test_connect_all_names_each_failure_once() {
    let log = CallLog::new();
    let manager = fleet(&log, &["cache"]);
    manager.connect_all(&Context::new()).await.unwrap();

    let errors = manager.connect_all(&Context::new()).await.unwrap_err();
    let err = errors.get("cache").unwrap();
    assert_eq!(err.to_string(), "cache: invalid state for connect: connected");
    assert!(matches!(
        err,
        ResourceError::Named { source, .. } if source.is_invalid_state()
    ));
}

#[tokio::test]
async fn test_connect_all_runs_concurrently() {
    let log = CallLog::new();
    let manager = Manager::new();
    for name in ["a", "b", "c", "d"] {
        manager
            .register(shared(
                &Probe::new(name, &log)
                    .with_connect_delay(Duration::from_millis(200))
                    .shared(),
            ))
            .unwrap();
    }

    let start = tokio::time::Instant::now();
    manager.connect_all(&Context::new()).await.unwrap();
    assert!(
        start.elapsed() < Duration::from_millis(600),
        "connects ran sequentially: {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_connect_all_with_retries_through_builder() {
    let log = CallLog::new();
    let manager = Manager::new();
    let flaky = Probe::new("flaky", &log).failing(2).shared();
    let resource = Builder::new(shared(&flaky))
        .with_reconnect(
            ReconnectConfig::builder()
                .max_retries(3)
                .initial_interval(Duration::from_millis(5))
                .build(),
        )
        .build();
    manager.register(resource).unwrap();

    manager.connect_all(&Context::new()).await.unwrap();
    assert_eq!(flaky.connects(), 3);
    assert_eq!(flaky.state(), State::Connected);
}

#[tokio::test]
async fn test_connect_all_stops_waiting_on_deadline() {
    let log = CallLog::new();
    let manager = Manager::new();
    manager
        .register(shared(&Probe::new("fast", &log).shared()))
        .unwrap();
    manager
        .register(shared(
            &Probe::new("slow", &log)
                .with_connect_delay(Duration::from_secs(30))
                .shared(),
        ))
        .unwrap();

    let cx = Context::new().with_timeout(Duration::from_millis(50));
    let start = tokio::time::Instant::now();
    let errors = manager.connect_all(&cx).await.unwrap_err();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(
        errors.to_string().contains("context deadline exceeded"),
        "{errors}"
    );
    assert_eq!(manager.must_get("fast").state(), State::Connected);
}

#[tokio::test]
async fn test_connect_all_on_empty_manager() {
    let manager = Manager::new();
    assert!(manager.connect_all(&Context::new()).await.is_ok());
    assert!(manager.close_all(&Context::new()).await.is_ok());
    assert!(manager.health_check(&Context::new()).await.is_empty());
}

#[tokio::test]
async fn test_close_all_reverse_registration_order() {
    let log = CallLog::new();
    let manager = fleet(&log, &["A", "B", "C"]);
    manager.connect_all(&Context::new()).await.unwrap();

    manager.close_all(&Context::new()).await.unwrap();

    assert_eq!(log.filtered("close:"), vec!["close:C", "close:B", "close:A"]);
    for name in ["A", "B", "C"] {
        assert_eq!(manager.must_get(name).state(), State::Disconnected);
    }
}

#[tokio::test]
async fn test_close_all_continues_past_failures() {
    let log = CallLog::new();
    let manager = Manager::new();
    manager
        .register(shared(&Probe::new("a", &log).shared()))
        .unwrap();
    manager
        .register(shared(
            &Probe::new("b", &log).with_close_error("broken pipe").shared(),
        ))
        .unwrap();
    manager
        .register(shared(&Probe::new("c", &log).shared()))
        .unwrap();
    manager.connect_all(&Context::new()).await.unwrap();

    let errors = manager.close_all(&Context::new()).await.unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors.get("b"),
        Some(ResourceError::Named { name, .. }) if name == "b"
    ));
    assert_eq!(log.filtered("close:"), vec!["close:c", "close:b", "close:a"]);
}

#[tokio::test]
async fn test_close_all_on_unconnected_fleet_is_noop() {
    let log = CallLog::new();
    let manager = fleet(&log, &["a", "b"]);

    manager.close_all(&Context::new()).await.unwrap();
    assert_eq!(manager.must_get("a").state(), State::Disconnected);
}
