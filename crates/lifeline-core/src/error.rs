//! Error taxonomy for resource lifecycle operations.
//!
//! Every fallible operation returns [`ResourceError`]. Fan-out operations on a
//! whole fleet return [`MultiError`], which keeps each per-resource cause.
//!
//! # Connection error classification
//!
//! Backends do not share an error type, so whether a failure is transient is
//! decided by [`is_connection_error`], a substring match over the lowercased
//! messages of the error chain:
//!
//! ```rust
//! use lifeline_core::{is_connection_error, ResourceError};
//!
//! assert!(is_connection_error(Some(&ResourceError::msg("connection refused"))));
//! assert!(is_connection_error(Some(&ResourceError::msg("unexpected EOF"))));
//! assert!(!is_connection_error(Some(&ResourceError::msg("access denied"))));
//! assert!(!is_connection_error(None));
//! ```
//!
//! The match is deliberately coarse ("closed" matches many unrelated messages).
//! Narrowing it would change which failures trigger reconnects, so it stays as is.

use crate::state::State;
use std::error::Error as StdError;
use std::fmt;

/// Boxed error used to carry backend-specific failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Substrings that mark an error message as a transient connection failure.
const CONNECTION_ERROR_KEYWORDS: &[&str] = &[
    "connection refused",
    "connection reset",
    "broken pipe",
    "no such host",
    "timeout",
    "eof",
    "closed",
];

/// Errors produced by resources, decorators and the manager.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// `connect` was called while the resource was not `Disconnected`.
    #[error("invalid state for connect: {state}")]
    InvalidState {
        /// Resource name.
        name: String,
        /// State observed when the CAS failed.
        state: State,
    },

    /// The resource has no live handle.
    #[error("not connected")]
    NotConnected {
        /// Resource name.
        name: String,
    },

    /// The caller's context was cancelled.
    #[error("context cancelled")]
    Cancelled,

    /// The caller's context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Every connect attempt failed.
    #[error("connect failed after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Total attempts made, initial attempt included.
        attempts: u32,
        /// The last underlying failure.
        source: Box<ResourceError>,
    },

    /// A ping failed with a connection error and the reconnect sequence failed too.
    #[error("ping failed, reconnect failed: {source}")]
    ReconnectFailed {
        /// Why the reconnect failed.
        source: Box<ResourceError>,
    },

    /// A resource with the same name is already registered.
    #[error("resource {name:?} already registered")]
    Duplicate {
        /// The conflicting name.
        name: String,
    },

    /// No resource is registered under the name.
    #[error("resource {name:?} not found")]
    NotFound {
        /// The requested name.
        name: String,
    },

    /// A per-resource failure inside a fleet-wide operation.
    #[error("{name}: {source}")]
    Named {
        /// Resource the failure belongs to.
        name: String,
        /// The failure itself.
        source: Box<ResourceError>,
    },

    /// A fan-out worker panicked or was aborted before reporting.
    #[error("{name}: worker task failed: {message}")]
    TaskFailed {
        /// Resource the worker was operating on.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// A failure reported by a concrete backend.
    #[error(transparent)]
    Backend(BoxError),
}

impl ResourceError {
    /// Wraps any backend error.
    pub fn backend<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        ResourceError::Backend(error.into())
    }

    /// Creates a backend error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        ResourceError::Backend(message.into().into())
    }

    /// Attaches the name of the resource this failure came from.
    pub fn named(self, name: impl Into<String>) -> Self {
        ResourceError::Named {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Returns the resource name attached by [`named`](Self::named), if any.
    pub fn resource_name(&self) -> Option<&str> {
        match self {
            ResourceError::Named { name, .. } | ResourceError::TaskFailed { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Returns `true` for `Cancelled` and `DeadlineExceeded`.
    pub fn is_context_error(&self) -> bool {
        matches!(
            self,
            ResourceError::Cancelled | ResourceError::DeadlineExceeded
        )
    }

    /// Returns `true` if this is an invalid-state error.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, ResourceError::InvalidState { .. })
    }

    /// Returns `true` if this is a duplicate registration error.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ResourceError::Duplicate { .. })
    }

    /// Returns `true` if this error is classified as a transient connection failure.
    pub fn is_connection_error(&self) -> bool {
        is_connection_error(Some(self))
    }
}

/// Classifies an error as a transient connection failure.
///
/// The lowercased message of every error in the source chain is matched against
/// a fixed keyword list. `None` is never a connection error.
///
/// Lifecycle errors raised by this crate are never transient, and the resource
/// names some of them carry are not matched: a resource called `geofence` does
/// not turn its `NotConnected` into a connection error.
pub fn is_connection_error(error: Option<&(dyn StdError + 'static)>) -> bool {
    let mut current = error;
    while let Some(err) = current {
        if let Some(message) = classified_message(err) {
            let message = message.to_lowercase();
            if CONNECTION_ERROR_KEYWORDS
                .iter()
                .any(|keyword| message.contains(keyword))
            {
                return true;
            }
        }
        current = err.source();
    }
    false
}

/// The part of `err`'s own message that takes part in classification.
fn classified_message(err: &(dyn StdError + 'static)) -> Option<String> {
    // Boxed causes inside wrappers surface as `Box<ResourceError>`.
    let resource_error = err
        .downcast_ref::<ResourceError>()
        .or_else(|| err.downcast_ref::<Box<ResourceError>>().map(|boxed| &**boxed));
    match resource_error {
        Some(
            ResourceError::InvalidState { .. }
            | ResourceError::NotConnected { .. }
            | ResourceError::Cancelled
            | ResourceError::DeadlineExceeded
            | ResourceError::Duplicate { .. }
            | ResourceError::NotFound { .. },
        ) => None,
        // Wrappers: the cause is visited next.
        Some(
            ResourceError::Named { .. }
            | ResourceError::RetryExhausted { .. }
            | ResourceError::ReconnectFailed { .. },
        ) => None,
        Some(ResourceError::TaskFailed { message, .. }) => Some(message.clone()),
        _ => Some(err.to_string()),
    }
}

/// Aggregate of independent per-resource failures.
///
/// Returned by fleet-wide operations that keep going after one resource fails.
/// Every individual cause stays reachable through [`iter`](Self::iter) or
/// [`into_errors`](Self::into_errors).
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<ResourceError>,
}

impl MultiError {
    /// Creates an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a failure.
    pub fn push(&mut self, error: ResourceError) {
        self.errors.push(error);
    }

    /// Returns `Ok(())` when nothing failed, the aggregate otherwise.
    pub fn into_result(self) -> Result<(), MultiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Iterates over the collected failures.
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceError> {
        self.errors.iter()
    }

    /// Number of collected failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the failure attributed to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&ResourceError> {
        self.errors
            .iter()
            .find(|err| err.resource_name() == Some(name))
    }

    /// Consumes the aggregate and returns the individual failures.
    pub fn into_errors(self) -> Vec<ResourceError> {
        self.errors
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl StdError for MultiError {}

impl FromIterator<ResourceError> for MultiError {
    fn from_iter<I: IntoIterator<Item = ResourceError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MultiError {
    type Item = ResourceError;
    type IntoIter = std::vec::IntoIter<ResourceError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a ResourceError;
    type IntoIter = std::slice::Iter<'a, ResourceError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
