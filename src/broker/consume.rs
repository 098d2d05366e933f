//! Bounded polling loop used by receive steps.
//!
//! The loop alternates between polling and committing until the consumer
//! has been idle for `max_idle_polls` consecutive polls:
//!
//! ```text
//! Polling --poll--> Committing --commit--> Polling
//!                              \--idle threshold reached--> Stopped
//! ```
//!
//! The commit runs after every poll, including empty ones.

use std::time::Duration;

use log::{debug, info, warn};

use super::{
    BrokerConsumer,
    BrokerError,
    BrokerRecord,
    ConsumeError,
    ConsumeSettings,
    ConsumedRecords,
    ConsumerFactory,
    ConsumerLocalConfig,
    DeliveryStatus,
    commit::CommitMode,
};
use crate::{config::ConsumerDefaults, metrics};

/// Position of a [`ConsumptionLoop`] in its state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// The next transition polls the consumer.
    Polling,
    /// The next transition applies the commit policy. `exhausted` records
    /// whether the idle threshold was reached by the preceding poll.
    Committing {
        /// Whether the loop stops after this commit.
        exhausted: bool,
    },
    /// Terminal state; the consumer has been released.
    Stopped,
}

/// Closes the consumer when dropped, whatever path ends the receive.
struct ConsumerGuard {
    consumer: Box<dyn BrokerConsumer>,
    closed: bool,
}

impl ConsumerGuard {
    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.consumer.close();
        }
    }
}

impl Drop for ConsumerGuard {
    fn drop(&mut self) { self.release(); }
}

/// Drains a subscribed consumer within an idle-poll budget.
pub struct ConsumptionLoop {
    guard: ConsumerGuard,
    commit: CommitMode,
    max_idle_polls: u32,
    poll_timeout: Duration,
    idle_polls: u32,
    records: Vec<BrokerRecord>,
    state: LoopState,
}

impl ConsumptionLoop {
    /// Take ownership of `consumer` for one receive.
    #[must_use]
    pub fn new(consumer: Box<dyn BrokerConsumer>, settings: &ConsumeSettings) -> Self {
        Self {
            guard: ConsumerGuard {
                consumer,
                closed: false,
            },
            commit: settings.commit,
            max_idle_polls: settings.max_idle_polls.max(1),
            poll_timeout: settings.poll_timeout,
            idle_polls: 0,
            records: Vec::new(),
            state: LoopState::Polling,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoopState { self.state }

    /// Consecutive empty polls so far.
    #[must_use]
    pub fn idle_polls(&self) -> u32 { self.idle_polls }

    /// Records accumulated so far, in arrival order.
    #[must_use]
    pub fn records(&self) -> &[BrokerRecord] { &self.records }

    /// Perform one transition and return the new state.
    ///
    /// # Errors
    ///
    /// Returns the [`BrokerError`] raised by a poll or commit. The loop then
    /// stays in its current state; dropping it releases the consumer.
    pub async fn advance(&mut self) -> Result<LoopState, BrokerError> {
        match self.state {
            LoopState::Polling => {
                let batch = self.guard.consumer.poll(self.poll_timeout).await?;
                self.absorb(batch);
                self.state = LoopState::Committing {
                    exhausted: self.idle_polls >= self.max_idle_polls,
                };
            }
            LoopState::Committing { exhausted } => {
                self.apply_commit().await?;
                if exhausted {
                    self.guard.release();
                    self.state = LoopState::Stopped;
                } else {
                    self.state = LoopState::Polling;
                }
            }
            LoopState::Stopped => {}
        }
        Ok(self.state)
    }

    /// Run until [`LoopState::Stopped`] and return the fetched records.
    ///
    /// # Errors
    ///
    /// Returns the first [`BrokerError`]; the consumer is released either way.
    pub async fn run(mut self) -> Result<Vec<BrokerRecord>, BrokerError> {
        while self.advance().await? != LoopState::Stopped {}
        Ok(std::mem::take(&mut self.records))
    }

    fn absorb(&mut self, batch: Vec<BrokerRecord>) {
        if batch.is_empty() {
            self.idle_polls += 1;
            metrics::inc_idle_polls();
            debug!("empty poll {} of {}", self.idle_polls, self.max_idle_polls);
            return;
        }
        info!("got {} records after {} empty polls", batch.len(), self.idle_polls);
        self.idle_polls = 0;
        metrics::add_records_consumed(batch.len());
        for record in &batch {
            debug!(
                "record key={:?} value={} partition={} offset={}",
                record.key, record.value, record.partition, record.offset
            );
        }
        self.records.extend(batch);
    }

    async fn apply_commit(&mut self) -> Result<(), BrokerError> {
        match self.commit {
            CommitMode::Sync => self.guard.consumer.commit_sync().await,
            CommitMode::Async => self.guard.consumer.commit_async(),
            CommitMode::None => {
                warn!("broker consumer neither committed synchronously nor asynchronously");
                Ok(())
            }
        }
    }
}

/// Receive from `topic` and shape the result for a step response.
///
/// The commit configuration is validated before the consumer is created, so
/// a misconfigured receive never touches the broker.
///
/// # Errors
///
/// Returns [`ConsumeError::Configuration`] for invalid overrides,
/// [`ConsumeError::Broker`] for client failures and
/// [`ConsumeError::Dump`] when the requested records dump cannot be written.
pub async fn receive<F>(
    factory: &F,
    topic: &str,
    request: &str,
    defaults: &ConsumerDefaults,
) -> Result<String, ConsumeError>
where
    F: ConsumerFactory + ?Sized,
{
    let local = ConsumerLocalConfig::from_request(request)?;
    let settings = ConsumeSettings::resolve(local.as_ref(), defaults)?;
    let consumer = factory.subscribe(topic).await?;
    let records = ConsumptionLoop::new(consumer, &settings).run().await?;
    let consumed = ConsumedRecords::new(records);

    if let Some(path) = &settings.dump_to {
        let dump = serde_json::to_vec_pretty(&consumed)?;
        tokio::fs::write(path, dump)
            .await
            .map_err(|source| ConsumeError::Dump {
                path: path.clone(),
                source,
            })?;
    }

    let rendered = if settings.show_records {
        serde_json::to_string(&consumed)?
    } else {
        serde_json::to_string(&DeliveryStatus::consumed(consumed.size))?
    };
    Ok(rendered)
}
