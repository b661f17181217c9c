//! Base configuration shared by backend adapters.

use std::time::Duration;

/// Settings common to every backend adapter.
///
/// Adapters embed this next to their driver-specific settings. The
/// `enable_tracing`/`enable_metrics` flags are read by composition code to
/// decide which decorators to apply.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResourceConfig {
    /// Registration name.
    pub name: String,
    /// Upper bound for a single connect attempt.
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub connect_timeout: Duration,
    /// Upper bound for reads.
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub read_timeout: Duration,
    /// Upper bound for writes.
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub write_timeout: Duration,
    /// Driver-level retry count.
    pub max_retries: u32,
    /// Wrap the resource in a tracing decorator.
    pub enable_tracing: bool,
    /// Wrap the resource in a metrics decorator.
    pub enable_metrics: bool,
}

impl ResourceConfig {
    /// Creates a new builder.
    pub fn builder() -> ResourceConfigBuilder {
        ResourceConfigBuilder::default()
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            max_retries: 3,
            enable_tracing: false,
            enable_metrics: false,
        }
    }
}

/// Builder for [`ResourceConfig`].
#[derive(Debug, Default)]
pub struct ResourceConfigBuilder {
    config: ResourceConfig,
}

impl ResourceConfigBuilder {
    /// Sets the registration name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Sets the write timeout.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    /// Sets the driver-level retry count.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Requests the tracing decorator.
    pub fn enable_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Requests the metrics decorator.
    pub fn enable_metrics(mut self, enabled: bool) -> Self {
        self.config.enable_metrics = enabled;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ResourceConfig {
        self.config
    }
}
