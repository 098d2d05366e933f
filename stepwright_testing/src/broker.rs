//! Scripted broker doubles.
//!
//! [`ScriptedFactory`] hands out consumers that replay a fixed list of poll
//! results and then poll empty forever. Every interaction is counted in a
//! shared [`BrokerJournal`].

use std::{
    collections::VecDeque,
    ops::Range,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::json;
use stepwright::broker::{
    BrokerConsumer,
    BrokerError,
    BrokerProducer,
    BrokerRecord,
    ConsumerFactory,
    ProducerRecord,
    RecordMetadata,
};

/// One scripted poll result; `Err` fails the poll with that message.
pub type Batch = Result<Vec<BrokerRecord>, &'static str>;

/// Counters of broker interactions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrokerJournal {
    /// Consumers created.
    pub subscriptions: usize,
    /// Polls issued.
    pub polls: usize,
    /// Polls that returned records, by 1-based poll number.
    pub non_empty_polls: Vec<usize>,
    /// Synchronous commits.
    pub sync_commits: usize,
    /// Asynchronous commits.
    pub async_commits: usize,
    /// Consumers closed.
    pub closes: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> { mutex.lock().unwrap_or_else(PoisonError::into_inner) }

/// Build records `offsets` on `partition` with `{"n": offset}` values.
#[must_use]
pub fn records(partition: i32, offsets: Range<i64>) -> Vec<BrokerRecord> {
    offsets
        .map(|offset| BrokerRecord::new(Some("k"), json!({"n": offset}), partition, offset))
        .collect()
}

struct ScriptedConsumer {
    script: VecDeque<Batch>,
    journal: Arc<Mutex<BrokerJournal>>,
}

#[async_trait]
impl BrokerConsumer for ScriptedConsumer {
    async fn poll(&mut self, _timeout: Duration) -> Result<Vec<BrokerRecord>, BrokerError> {
        let mut journal = lock(&self.journal);
        journal.polls += 1;
        let batch = self.script.pop_front().unwrap_or(Ok(Vec::new()));
        if let Ok(records) = &batch
            && !records.is_empty()
        {
            let poll = journal.polls;
            journal.non_empty_polls.push(poll);
        }
        batch.map_err(|e| BrokerError::Poll(e.into()))
    }

    async fn commit_sync(&mut self) -> Result<(), BrokerError> {
        lock(&self.journal).sync_commits += 1;
        Ok(())
    }

    fn commit_async(&mut self) -> Result<(), BrokerError> {
        lock(&self.journal).async_commits += 1;
        Ok(())
    }

    fn close(&mut self) { lock(&self.journal).closes += 1; }
}

/// [`ConsumerFactory`] whose first consumer replays a script.
///
/// Later subscriptions get consumers that only ever poll empty.
pub struct ScriptedFactory {
    script: Mutex<Option<VecDeque<Batch>>>,
    journal: Arc<Mutex<BrokerJournal>>,
}

impl ScriptedFactory {
    /// Create a factory replaying `script`.
    #[must_use]
    pub fn new(script: Vec<Batch>) -> Self {
        Self {
            script: Mutex::new(Some(script.into())),
            journal: Arc::default(),
        }
    }

    /// Snapshot of the interactions so far.
    #[must_use]
    pub fn journal(&self) -> BrokerJournal { lock(&self.journal).clone() }
}

#[async_trait]
impl ConsumerFactory for ScriptedFactory {
    async fn subscribe(&self, _topic: &str) -> Result<Box<dyn BrokerConsumer>, BrokerError> {
        lock(&self.journal).subscriptions += 1;
        let script = lock(&self.script).take().unwrap_or_default();
        Ok(Box::new(ScriptedConsumer {
            script,
            journal: Arc::clone(&self.journal),
        }))
    }
}

/// [`BrokerProducer`] that stores every published record.
#[derive(Default)]
pub struct RecordingProducer {
    sent: Mutex<Vec<(String, ProducerRecord)>>,
}

impl RecordingProducer {
    /// Create an empty producer.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Published `(topic, record)` pairs in order.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, ProducerRecord)> { lock(&self.sent).clone() }
}

#[async_trait]
impl BrokerProducer for RecordingProducer {
    async fn send(&self, topic: &str, record: ProducerRecord) -> Result<RecordMetadata, BrokerError> {
        let mut sent = lock(&self.sent);
        let offset = i64::try_from(sent.len()).map_err(|e| BrokerError::Publish {
            topic: topic.to_owned(),
            source: e.into(),
        })?;
        let partition = record.partition.unwrap_or(0);
        sent.push((topic.to_owned(), record));
        Ok(RecordMetadata {
            topic: topic.to_owned(),
            partition,
            offset,
        })
    }
}
