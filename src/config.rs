//! Process-wide engine configuration.
//!
//! [`EngineConfig`] bundles the HTTP endpoint used to qualify relative step
//! targets and the default consumer settings applied to broker receives.
//! Values are read-only for the duration of a scenario run.

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading an [`EngineConfig`] from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid TOML for [`EngineConfig`].
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration for a scenario engine.
///
/// # Examples
///
/// ```
/// use stepwright::config::{EndpointConfig, EngineConfig};
///
/// let config = EngineConfig::default().with_endpoint(EndpointConfig::new(
///     "http://localhost",
///     8080,
///     "/api",
/// ));
/// assert_eq!(config.endpoint.port, 8080);
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Base address for relative HTTP targets.
    pub endpoint: EndpointConfig,
    /// Defaults for broker receive steps.
    pub consumer: ConsumerDefaults,
}

impl EngineConfig {
    /// Load a configuration from a TOML file.
    ///
    /// Missing sections fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML for
    /// this structure.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        Ok(config.normalized())
    }

    /// Replace the endpoint configuration.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Replace the consumer defaults.
    #[must_use]
    pub fn with_consumer(mut self, consumer: ConsumerDefaults) -> Self {
        self.consumer = consumer;
        self
    }

    /// Clamp nested values to usable bounds.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.consumer = self.consumer.normalized();
        self
    }
}

/// Host, port and context path prefixed onto relative HTTP targets.
///
/// The host carries its scheme (for example `http://localhost`). The context
/// path is either empty or starts with `/`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    /// Scheme and host, e.g. `http://localhost`.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Application context path, e.g. `/api` or an empty string.
    pub context: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_owned(),
            port: 8080,
            context: String::new(),
        }
    }
}

impl EndpointConfig {
    /// Build an endpoint from its parts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, context: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            context: context.into(),
        }
    }

    /// Qualify `target` unless it is already an absolute `http(s)` URL.
    ///
    /// ```
    /// use stepwright::config::EndpointConfig;
    ///
    /// let endpoint = EndpointConfig::new("http://localhost", 9000, "/shop");
    /// assert_eq!(
    ///     endpoint.qualify("/orders/1"),
    ///     "http://localhost:9000/shop/orders/1"
    /// );
    /// assert_eq!(
    ///     endpoint.qualify("https://example.org/a"),
    ///     "https://example.org/a"
    /// );
    /// ```
    #[must_use]
    pub fn qualify(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_owned()
        } else {
            format!("{}:{}{}{}", self.host, self.port, self.context, target)
        }
    }
}

/// Default settings applied to every broker receive.
///
/// # Default Values
/// - `commit_sync`: `false`
/// - `commit_async`: `false`
/// - `max_idle_polls`: 5
/// - `poll_timeout`: 100 milliseconds
///
/// # Invariants
/// - `max_idle_polls` is at least 1
/// - `poll_timeout` is at least 1 millisecond
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsumerDefaults {
    /// Commit offsets synchronously after each poll.
    pub commit_sync: bool,
    /// Commit offsets asynchronously after each poll.
    pub commit_async: bool,
    /// Consecutive empty polls after which a receive stops.
    pub max_idle_polls: u32,
    /// Upper bound on a single poll.
    #[serde(with = "millis")]
    pub poll_timeout: Duration,
}

impl Default for ConsumerDefaults {
    fn default() -> Self {
        Self {
            commit_sync: false,
            commit_async: false,
            max_idle_polls: 5,
            poll_timeout: Duration::from_millis(100),
        }
    }
}

impl ConsumerDefaults {
    /// Set the default synchronous commit flag.
    #[must_use]
    pub fn with_commit_sync(mut self, enabled: bool) -> Self {
        self.commit_sync = enabled;
        self
    }

    /// Set the default asynchronous commit flag.
    #[must_use]
    pub fn with_commit_async(mut self, enabled: bool) -> Self {
        self.commit_async = enabled;
        self
    }

    /// Set the idle-poll threshold.
    #[must_use]
    pub fn with_max_idle_polls(mut self, polls: u32) -> Self {
        self.max_idle_polls = polls;
        self
    }

    /// Set the per-poll timeout.
    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Clamp the idle threshold and poll timeout to their minimums.
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use stepwright::config::ConsumerDefaults;
    ///
    /// let defaults = ConsumerDefaults::default()
    ///     .with_max_idle_polls(0)
    ///     .with_poll_timeout(Duration::ZERO)
    ///     .normalized();
    /// assert_eq!(defaults.max_idle_polls, 1);
    /// assert_eq!(defaults.poll_timeout, Duration::from_millis(1));
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.max_idle_polls = self.max_idle_polls.max(1);
        self.poll_timeout = self.poll_timeout.max(Duration::from_millis(1));
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
