//! Per-receive overrides and commit-mode selection.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_json::Value;

use super::error::ConfigurationError;
use crate::config::ConsumerDefaults;

/// Offset commit applied after each poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitMode {
    /// Block until offsets are committed.
    Sync,
    /// Request a commit without waiting for it.
    Async,
    /// Leave offsets to the caller.
    None,
}

impl CommitMode {
    /// Combine per-receive overrides with the process defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::BothCommitModes`] when the effective
    /// sync and async flags are both true.
    ///
    /// ```
    /// use stepwright::{broker::CommitMode, config::ConsumerDefaults};
    ///
    /// let defaults = ConsumerDefaults::default().with_commit_async(true);
    /// assert_eq!(CommitMode::resolve(None, None, &defaults), Ok(CommitMode::Async));
    /// assert_eq!(
    ///     CommitMode::resolve(Some(true), Some(false), &defaults),
    ///     Ok(CommitMode::Sync)
    /// );
    /// assert!(CommitMode::resolve(Some(true), None, &defaults).is_err());
    /// ```
    pub fn resolve(
        sync: Option<bool>,
        asynchronous: Option<bool>,
        defaults: &ConsumerDefaults,
    ) -> Result<Self, ConfigurationError> {
        let sync = sync.unwrap_or(defaults.commit_sync);
        let asynchronous = asynchronous.unwrap_or(defaults.commit_async);
        match (sync, asynchronous) {
            (true, true) => Err(ConfigurationError::BothCommitModes),
            (true, false) => Ok(Self::Sync),
            (false, true) => Ok(Self::Async),
            (false, false) => Ok(Self::None),
        }
    }
}

/// Overrides carried by a receive request under `consumerLocalConfigs`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerLocalConfig {
    /// Override for synchronous commits.
    pub commit_sync: Option<bool>,
    /// Override for asynchronous commits.
    pub commit_async: Option<bool>,
    /// Return the fetched records (`true`, the default) or a delivery summary.
    pub show_records_as_response: Option<bool>,
    /// File to write the consumed records to.
    pub records_dump_to: Option<PathBuf>,
    /// Override for the idle-poll threshold.
    #[serde(rename = "maxNoOfRetryPollsOrTimeouts")]
    pub max_idle_polls: Option<u32>,
    /// Override for the poll timeout, in milliseconds.
    #[serde(rename = "pollingTime")]
    pub poll_timeout_ms: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalConfigWrap {
    consumer_local_configs: Option<ConsumerLocalConfig>,
}

impl ConsumerLocalConfig {
    /// Extract overrides from a receive request.
    ///
    /// Empty, `null` and wrapper-less requests carry no overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidLocalConfig`] when the request is
    /// not JSON or the overrides have the wrong shape.
    pub fn from_request(request: &str) -> Result<Option<Self>, ConfigurationError> {
        if request.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(request)
            .map_err(|e| ConfigurationError::InvalidLocalConfig(e.to_string()))?;
        if !value.is_object() {
            return Ok(None);
        }
        let wrap: LocalConfigWrap = serde_json::from_value(value)
            .map_err(|e| ConfigurationError::InvalidLocalConfig(e.to_string()))?;
        Ok(wrap.consumer_local_configs)
    }
}

/// Effective settings of one receive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumeSettings {
    /// Commit applied after every poll.
    pub commit: CommitMode,
    /// Consecutive empty polls after which the receive stops.
    pub max_idle_polls: u32,
    /// Upper bound on a single poll.
    pub poll_timeout: Duration,
    /// Return records rather than a delivery summary.
    pub show_records: bool,
    /// Optional records dump location.
    pub dump_to: Option<PathBuf>,
}

impl ConsumeSettings {
    /// Merge overrides into the defaults and validate the commit mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::BothCommitModes`] when both commit
    /// modes end up enabled.
    pub fn resolve(
        local: Option<&ConsumerLocalConfig>,
        defaults: &ConsumerDefaults,
    ) -> Result<Self, ConfigurationError> {
        let local = local.cloned().unwrap_or_default();
        let commit = CommitMode::resolve(local.commit_sync, local.commit_async, defaults)?;
        let poll_timeout = local
            .poll_timeout_ms
            .map_or(defaults.poll_timeout, Duration::from_millis);
        Ok(Self {
            commit,
            max_idle_polls: local.max_idle_polls.unwrap_or(defaults.max_idle_polls).max(1),
            poll_timeout: poll_timeout.max(Duration::from_millis(1)),
            show_records: local.show_records_as_response.unwrap_or(true),
            dump_to: local.records_dump_to,
        })
    }
}
