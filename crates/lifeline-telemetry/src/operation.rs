use std::fmt;

/// A lifecycle operation observed by the decorators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `Resource::connect`
    Connect,
    /// `Resource::ping`
    Ping,
    /// `Resource::close`
    Close,
}

impl Operation {
    /// Label value used in span names and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Connect => "connect",
            Operation::Ping => "ping",
            Operation::Close => "close",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label value for the outcome of an operation.
pub(crate) fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "error"
    }
}
