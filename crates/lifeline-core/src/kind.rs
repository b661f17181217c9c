//! Resource family tags.

use std::borrow::Cow;
use std::fmt;

/// Identifies the family a resource belongs to ("mysql", "redis", "kafka", ...).
///
/// `Kind` is an open tag rather than an exhaustive enum: adapters for new
/// backends create their own with [`Kind::new`] or [`Kind::from_static`]. The
/// well-known families are provided as associated constants.
///
/// ```rust
/// use lifeline_core::Kind;
///
/// let scylla = Kind::new("scylla");
/// assert_eq!(scylla.as_str(), "scylla");
/// assert_eq!(Kind::REDIS, Kind::new("redis"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Kind(Cow<'static, str>);

impl Kind {
    pub const MYSQL: Kind = Kind::from_static("mysql");
    pub const POSTGRESQL: Kind = Kind::from_static("postgresql");
    pub const REDIS: Kind = Kind::from_static("redis");
    pub const MONGODB: Kind = Kind::from_static("mongodb");
    pub const CLICKHOUSE: Kind = Kind::from_static("clickhouse");
    pub const ELASTICSEARCH: Kind = Kind::from_static("elasticsearch");
    pub const KAFKA: Kind = Kind::from_static("kafka");
    pub const RABBITMQ: Kind = Kind::from_static("rabbitmq");
    pub const MEMORY: Kind = Kind::from_static("memory");
    pub const UNKNOWN: Kind = Kind::from_static("unknown");

    /// Creates a kind from any string.
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Kind(kind.into())
    }

    /// Creates a kind from a static string, usable in `const` position.
    pub const fn from_static(kind: &'static str) -> Self {
        Kind(Cow::Borrowed(kind))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Kind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Kind {
    fn from(kind: &'static str) -> Self {
        Kind::from_static(kind)
    }
}

impl From<String> for Kind {
    fn from(kind: String) -> Self {
        Kind(Cow::Owned(kind))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Kind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
