//! Connection state and the embeddable state machine.

use crate::error::ResourceError;
use crate::kind::Kind;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Connection state of a resource.
///
/// The lifecycle is `Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    /// No live handle; the only state `connect` may start from.
    Disconnected = 0,
    /// A connect attempt is in flight.
    Connecting = 1,
    /// A live handle exists.
    Connected = 2,
    /// A close is in flight.
    Disconnecting = 3,
}

impl State {
    /// Returns the lowercase name used in health reports and labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Disconnected => "disconnected",
            State::Connecting => "connecting",
            State::Connected => "connected",
            State::Disconnecting => "disconnecting",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => State::Connecting,
            2 => State::Connected,
            3 => State::Disconnecting,
            _ => State::Disconnected,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for State {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Identity plus an atomically updated [`State`].
///
/// Concrete adapters embed a `StateMachine` and delegate `name`, `kind` and
/// `state` to it. All state reads are lock-free; transitions out of
/// `Disconnected` go through [`compare_and_swap_state`](Self::compare_and_swap_state)
/// so that two concurrent connects cannot both proceed.
pub struct StateMachine {
    name: String,
    kind: Kind,
    state: AtomicU8,
}

impl StateMachine {
    /// Creates a machine in the `Disconnected` state.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            state: AtomicU8::new(State::Disconnected as u8),
        }
    }

    /// Returns the fleet-unique registration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resource family.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Returns the current state.
    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Unconditionally stores a new state.
    pub fn set_state(&self, state: State) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Moves to `new` only if the current state is `old`.
    ///
    /// Returns `true` when the swap happened.
    pub fn compare_and_swap_state(&self, old: State, new: State) -> bool {
        self.state
            .compare_exchange(old as u8, new as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Claims the connect slot by swapping `Disconnected -> Connecting`.
    ///
    /// Fails with [`ResourceError::InvalidState`] without touching the state when
    /// the resource is not disconnected, which is how a second concurrent
    /// connect learns it lost the race.
    ///
    /// The returned guard must be kept for the whole attempt. Call
    /// [`ConnectGuard::commit`] once the handle is live; a guard dropped
    /// uncommitted (failed attempt, or a connect future dropped mid-flight)
    /// puts the state back to `Disconnected`.
    pub fn begin_connect(&self) -> Result<ConnectGuard<'_>, ResourceError> {
        if self.compare_and_swap_state(State::Disconnected, State::Connecting) {
            Ok(ConnectGuard {
                machine: self,
                committed: false,
            })
        } else {
            Err(ResourceError::InvalidState {
                name: self.name.clone(),
                state: self.state(),
            })
        }
    }

    /// Claims the close slot from `Connected` or `Connecting`.
    ///
    /// Returns `false` when there is nothing to close.
    pub fn begin_close(&self) -> bool {
        self.compare_and_swap_state(State::Connected, State::Disconnecting)
            || self.compare_and_swap_state(State::Connecting, State::Disconnecting)
    }
}

/// An in-flight connect attempt claimed by [`StateMachine::begin_connect`].
#[must_use = "dropping the guard reverts the state to Disconnected"]
pub struct ConnectGuard<'a> {
    machine: &'a StateMachine,
    committed: bool,
}

impl ConnectGuard<'_> {
    /// Marks the attempt successful and moves to `Connected`.
    pub fn commit(mut self) {
        self.committed = true;
        self.machine.set_state(State::Connected);
    }
}

impl Drop for ConnectGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            // A close that raced the attempt owns the state from here.
            self.machine
                .compare_and_swap_state(State::Connecting, State::Disconnected);
        }
    }
}

impl fmt::Debug for ConnectGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectGuard")
            .field("resource", &self.machine.name())
            .field("committed", &self.committed)
            .finish()
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .finish()
    }
}
