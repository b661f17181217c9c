//! Shared test resources.
//!
//! [`Probe`] is a scriptable resource that appends every lifecycle call to a
//! shared [`CallLog`], so tests can assert on ordering across resources.

#![allow(dead_code)]

use async_trait::async_trait;
use lifeline::{Context, Kind, Resource, ResourceError, SharedResource, State, StateMachine};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Ordered record of lifecycle calls, e.g. `["connect:a", "close:a"]`.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Entries starting with `prefix`, e.g. every `"close:"`.
    pub fn filtered(&self, prefix: &str) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .cloned()
            .collect()
    }
}

pub struct Probe {
    machine: StateMachine,
    log: CallLog,
    connect_error: String,
    failing_connects: AtomicU32,
    always_fail: bool,
    connect_delay: Duration,
    ping_error: Mutex<Option<String>>,
    severed: AtomicBool,
    close_error: Option<String>,
    connects: AtomicUsize,
    pings: AtomicUsize,
}

impl Probe {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            machine: StateMachine::new(name, Kind::MEMORY),
            log: log.clone(),
            connect_error: "connection refused".to_string(),
            failing_connects: AtomicU32::new(0),
            always_fail: false,
            connect_delay: Duration::ZERO,
            ping_error: Mutex::new(None),
            severed: AtomicBool::new(false),
            close_error: None,
            connects: AtomicUsize::new(0),
            pings: AtomicUsize::new(0),
        }
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.machine = StateMachine::new(self.machine.name().to_string(), kind);
        self
    }

    /// The next `n` connects fail with `connection refused`.
    pub fn failing(self, n: u32) -> Self {
        self.failing_connects.store(n, Ordering::SeqCst);
        self
    }

    /// Every connect fails with `message`.
    pub fn broken(mut self, message: &str) -> Self {
        self.connect_error = message.to_string();
        self.always_fail = true;
        self
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    pub fn with_close_error(mut self, message: &str) -> Self {
        self.close_error = Some(message.to_string());
        self
    }

    /// Makes the following connects fail, e.g. to break a reconnect.
    pub fn fail_next_connects(&self, n: u32) {
        self.failing_connects.store(n, Ordering::SeqCst);
    }

    /// Breaks the live connection. Pings fail with `connection reset by peer`
    /// until the next successful connect.
    pub fn sever(&self) {
        self.severed.store(true, Ordering::SeqCst);
    }

    /// Pings fail with `message` until cleared, reconnects included.
    pub fn set_ping_error(&self, message: &str) {
        *self.ping_error.lock() = Some(message.to_string());
    }

    pub fn clear_ping_error(&self) {
        self.ping_error.lock().take();
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn next_connect_fails(&self) -> bool {
        self.always_fail
            || self
                .failing_connects
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
    }
}

#[async_trait]
impl Resource for Probe {
    async fn connect(&self, cx: &Context) -> Result<(), ResourceError> {
        let attempt = self.machine.begin_connect()?;
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("connect:{}", self.name()));

        if !self.connect_delay.is_zero() {
            cx.sleep(self.connect_delay).await?;
        }

        if self.next_connect_fails() {
            return Err(ResourceError::msg(self.connect_error.clone()));
        }

        self.severed.store(false, Ordering::SeqCst);
        attempt.commit();
        Ok(())
    }

    async fn ping(&self, _cx: &Context) -> Result<(), ResourceError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("ping:{}", self.name()));

        if self.severed.load(Ordering::SeqCst) {
            return Err(ResourceError::msg("read: connection reset by peer"));
        }
        if self.state() != State::Connected {
            return Err(ResourceError::NotConnected {
                name: self.name().to_string(),
            });
        }
        let injected = self.ping_error.lock().clone();
        match injected {
            Some(message) => Err(ResourceError::msg(message)),
            None => Ok(()),
        }
    }

    async fn close(&self, _cx: &Context) -> Result<(), ResourceError> {
        self.log.push(format!("close:{}", self.name()));
        if self.machine.begin_close() {
            self.machine.set_state(State::Disconnected);
        }
        match &self.close_error {
            Some(message) => Err(ResourceError::msg(message.clone())),
            None => Ok(()),
        }
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
}

/// Erases a concrete probe into a shared resource.
pub fn shared(probe: &Arc<Probe>) -> SharedResource {
    probe.clone()
}
