use lifeline_core::{Context, Kind, SharedResource, Stats};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Interval used by [`StatsCollector`] when none is given.
pub const DEFAULT_COLLECT_INTERVAL: Duration = Duration::from_secs(15);

/// Gauges mirroring a [`Stats`] snapshot.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    max_open: String,
    open: String,
    in_use: String,
    idle: String,
    wait_total: String,
    wait_duration_seconds: String,
}

impl PoolMetrics {
    /// Creates the metric names for `subsystem`, e.g. `<subsystem>_pool_open`.
    pub fn new(subsystem: &str) -> Self {
        let metrics = Self {
            max_open: format!("{subsystem}_pool_max_open"),
            open: format!("{subsystem}_pool_open"),
            in_use: format!("{subsystem}_pool_in_use"),
            idle: format!("{subsystem}_pool_idle"),
            wait_total: format!("{subsystem}_pool_wait_total"),
            wait_duration_seconds: format!("{subsystem}_pool_wait_duration_seconds"),
        };
        describe_gauge!(metrics.max_open.clone(), "Configured maximum of open connections");
        describe_gauge!(metrics.open.clone(), "Open connections");
        describe_gauge!(metrics.in_use.clone(), "Connections currently in use");
        describe_gauge!(metrics.idle.clone(), "Idle connections");
        describe_counter!(
            metrics.wait_total.clone(),
            "Total number of waits for a connection"
        );
        describe_gauge!(
            metrics.wait_duration_seconds.clone(),
            metrics::Unit::Seconds,
            "Total time spent waiting for a connection"
        );
        metrics
    }

    /// Publishes one snapshot.
    pub fn record(&self, name: &str, kind: &Kind, stats: &Stats) {
        let labels = [
            ("name", name.to_string()),
            ("kind", kind.as_str().to_string()),
        ];
        gauge!(self.max_open.clone(), &labels).set(stats.max_open_connections as f64);
        gauge!(self.open.clone(), &labels).set(stats.open_connections as f64);
        gauge!(self.in_use.clone(), &labels).set(stats.in_use as f64);
        gauge!(self.idle.clone(), &labels).set(stats.idle as f64);
        counter!(self.wait_total.clone(), &labels).absolute(stats.wait_count);
        gauge!(self.wait_duration_seconds.clone(), &labels)
            .set(stats.wait_duration.as_secs_f64());
    }
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new("resource")
    }
}

/// Periodically publishes pool statistics of registered resources.
///
/// Resources that do not expose stats are skipped. The background task runs
/// until [`stop`](Self::stop) is called, the collector is dropped, or the
/// context passed to [`start`](Self::start) ends.
pub struct StatsCollector {
    metrics: PoolMetrics,
    interval: Duration,
    resources: Arc<RwLock<Vec<SharedResource>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatsCollector {
    /// Creates a collector. A zero `interval` means [`DEFAULT_COLLECT_INTERVAL`].
    pub fn new(metrics: PoolMetrics, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            DEFAULT_COLLECT_INTERVAL
        } else {
            interval
        };
        Self {
            metrics,
            interval,
            resources: Arc::new(RwLock::new(Vec::new())),
            task: Mutex::new(None),
        }
    }

    /// The collection interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Adds a resource. Takes effect at the next collection.
    pub fn register(&self, resource: SharedResource) {
        self.resources.write().push(resource);
    }

    /// Collects once, right now. Returns how many resources reported stats.
    pub fn collect(&self) -> usize {
        collect_once(&self.metrics, &self.resources)
    }

    /// Starts the background task, replacing a running one.
    ///
    /// The first collection happens immediately. Must be called from within a
    /// tokio runtime.
    pub fn start(&self, cx: &Context) {
        let metrics = self.metrics.clone();
        let resources = Arc::clone(&self.resources);
        let period = self.interval;
        let cx = cx.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cx.done() => break,
                    _ = ticker.tick() => {
                        collect_once(&metrics, &resources);
                    }
                }
            }
        });

        if let Some(previous) = self.task.lock().replace(task) {
            previous.abort();
        }
    }

    /// Stops the background task.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    /// Returns `true` while the background task is alive.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for StatsCollector {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for StatsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsCollector")
            .field("interval", &self.interval)
            .field("resources", &self.resources.read().len())
            .finish()
    }
}

fn collect_once(metrics: &PoolMetrics, resources: &RwLock<Vec<SharedResource>>) -> usize {
    let resources = resources.read();
    let mut collected = 0;
    for resource in resources.iter() {
        if let Some(provider) = resource.as_stats() {
            metrics.record(resource.name(), resource.kind(), &provider.stats());
            collected += 1;
        }
    }
    collected
}
