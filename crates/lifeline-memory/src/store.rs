use async_trait::async_trait;
use lifeline_core::{
    Context, Kind, Resource, ResourceConfig, ResourceError, State, StateMachine, Stats,
    StatsProvider,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A live handle. Dropped on close, replaced on every connect.
#[derive(Debug, Default)]
struct Connection {
    broken: AtomicBool,
}

/// An in-process key/value store behind a connection handle.
///
/// Data survives reconnects, the way data on a server survives a client
/// reconnecting. Every data operation needs a live, unbroken handle.
///
/// Fault injection:
/// - [`fail_connects`](Self::fail_connects): the next `n` connects fail with
///   "connection refused"
/// - [`sever`](Self::sever): the live handle breaks, pings and data operations
///   fail with "connection reset by peer" until the next connect
/// - [`inject_ping_error`](Self::inject_ping_error): pings fail with a fixed
///   message until cleared
pub struct MemoryStore {
    machine: StateMachine,
    config: ResourceConfig,
    handle: RwLock<Option<Arc<Connection>>>,
    data: RwLock<HashMap<String, Vec<u8>>>,
    connect_latency: Duration,
    failing_connects: AtomicU32,
    ping_error: Mutex<Option<String>>,
    connect_attempts: AtomicU64,
    close_calls: AtomicU64,
}

impl MemoryStore {
    /// Creates a disconnected store with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let config = ResourceConfig::builder().name(name).build();
        Self::with_config(config)
    }

    /// Creates a disconnected store from a base configuration.
    ///
    /// `connect_timeout` bounds each connect.
    pub fn with_config(config: ResourceConfig) -> Self {
        Self {
            machine: StateMachine::new(config.name.clone(), Kind::MEMORY),
            config,
            handle: RwLock::new(None),
            data: RwLock::new(HashMap::new()),
            connect_latency: Duration::ZERO,
            failing_connects: AtomicU32::new(0),
            ping_error: Mutex::new(None),
            connect_attempts: AtomicU64::new(0),
            close_calls: AtomicU64::new(0),
        }
    }

    /// Reports `kind` instead of [`Kind::MEMORY`].
    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.machine = StateMachine::new(self.config.name.clone(), kind);
        self
    }

    /// Makes every connect take `latency`.
    pub fn with_connect_latency(mut self, latency: Duration) -> Self {
        self.connect_latency = latency;
        self
    }

    /// The configuration the store was built with.
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Makes the next `n` connects fail with "connection refused".
    pub fn fail_connects(&self, n: u32) {
        self.failing_connects.store(n, Ordering::SeqCst);
    }

    /// Breaks the live handle, if any.
    pub fn sever(&self) {
        if let Some(conn) = self.handle.read().as_ref() {
            conn.broken.store(true, Ordering::SeqCst);
        }
    }

    /// Makes pings fail with `message` until [`clear_ping_error`](Self::clear_ping_error).
    pub fn inject_ping_error(&self, message: impl Into<String>) {
        *self.ping_error.lock() = Some(message.into());
    }

    /// Removes an injected ping error.
    pub fn clear_ping_error(&self) {
        *self.ping_error.lock() = None;
    }

    /// Number of connect calls that got past the state check.
    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    /// Number of close calls, no-op ones included.
    pub fn close_calls(&self) -> u64 {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Returns `true` while a handle exists, broken or not.
    pub fn has_handle(&self) -> bool {
        self.handle.read().is_some()
    }

    /// Reads a value.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ResourceError> {
        self.live()?;
        Ok(self.data.read().get(key).cloned())
    }

    /// Writes a value, replacing any previous one.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Result<(), ResourceError> {
        self.live()?;
        self.data.write().insert(key.into(), value.into());
        Ok(())
    }

    /// Removes a value. Returns `true` if it existed.
    pub fn delete(&self, key: &str) -> Result<bool, ResourceError> {
        self.live()?;
        Ok(self.data.write().remove(key).is_some())
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize, ResourceError> {
        self.live()?;
        Ok(self.data.read().len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> Result<bool, ResourceError> {
        self.len().map(|len| len == 0)
    }

    fn live(&self) -> Result<Arc<Connection>, ResourceError> {
        let conn = self
            .handle
            .read()
            .clone()
            .ok_or_else(|| ResourceError::NotConnected {
                name: self.machine.name().to_string(),
            })?;
        if conn.broken.load(Ordering::SeqCst) {
            return Err(ResourceError::msg("read: connection reset by peer"));
        }
        Ok(conn)
    }

    async fn dial(&self) -> Result<Arc<Connection>, ResourceError> {
        if !self.connect_latency.is_zero() {
            tokio::time::sleep(self.connect_latency).await;
        }
        let refused = self
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(ResourceError::msg(format!(
                "dial memory://{}: connection refused",
                self.machine.name()
            )));
        }
        Ok(Arc::new(Connection::default()))
    }
}

#[async_trait]
impl Resource for MemoryStore {
    async fn connect(&self, cx: &Context) -> Result<(), ResourceError> {
        let attempt = self.machine.begin_connect()?;
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);

        let timeout = self.config.connect_timeout;
        let dialed = cx
            .run(async {
                match tokio::time::timeout(timeout, self.dial()).await {
                    Ok(dialed) => dialed,
                    Err(_) => Err(ResourceError::msg("connect timeout")),
                }
            })
            .await;

        let conn = dialed?;
        *self.handle.write() = Some(conn);
        attempt.commit();

        #[cfg(feature = "tracing")]
        tracing::trace!(resource = self.machine.name(), "memory store connected");

        Ok(())
    }

    async fn ping(&self, _cx: &Context) -> Result<(), ResourceError> {
        self.live()?;
        let injected = self.ping_error.lock().clone();
        if let Some(message) = injected {
            return Err(ResourceError::msg(message));
        }
        Ok(())
    }

    async fn close(&self, _cx: &Context) -> Result<(), ResourceError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if !self.machine.begin_close() {
            return Ok(());
        }
        self.handle.write().take();
        self.machine.set_state(State::Disconnected);

        #[cfg(feature = "tracing")]
        tracing::trace!(resource = self.machine.name(), "memory store closed");

        Ok(())
    }

    fn name(&self) -> &str {
        self.machine.name()
    }

    fn kind(&self) -> &Kind {
        self.machine.kind()
    }

    fn state(&self) -> State {
        self.machine.state()
    }

    fn as_stats(&self) -> Option<&dyn StatsProvider> {
        Some(self)
    }
}

impl StatsProvider for MemoryStore {
    fn stats(&self) -> Stats {
        let open = u64::from(self.handle.read().is_some());
        Stats {
            max_open_connections: 1,
            open_connections: open,
            in_use: 0,
            idle: open,
            wait_count: 0,
            wait_duration: Duration::ZERO,
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("machine", &self.machine)
            .field("connected", &self.has_handle())
            .finish()
    }
}
