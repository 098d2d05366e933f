//! Broker records and the JSON shapes returned to steps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status string reported for successful deliveries.
pub const STATUS_OK: &str = "Ok";

/// A record fetched from a partitioned topic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrokerRecord {
    /// Record key, if any.
    pub key: Option<String>,
    /// Record payload.
    pub value: Value,
    /// Partition the record was read from.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: i64,
}

impl BrokerRecord {
    /// Build a record.
    #[must_use]
    pub fn new(key: Option<&str>, value: Value, partition: i32, offset: i64) -> Self {
        Self {
            key: key.map(str::to_owned),
            value,
            partition,
            offset,
        }
    }
}

/// A record to publish.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProducerRecord {
    /// Record key.
    #[serde(default)]
    pub key: Option<String>,
    /// Record payload.
    #[serde(default)]
    pub value: Value,
    /// Target partition; the producer chooses when absent.
    #[serde(default)]
    pub partition: Option<i32>,
}

/// Where a published record landed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Topic written to.
    pub topic: String,
    /// Partition written to.
    pub partition: i32,
    /// Assigned offset.
    pub offset: i64,
}

/// Summary returned instead of raw records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatus {
    /// Always [`STATUS_OK`] for completed operations.
    pub status: String,
    /// Number of records consumed or published.
    pub records_count: usize,
    /// Per-record placement, for produce operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_metadata: Option<Vec<RecordMetadata>>,
}

impl DeliveryStatus {
    /// Summary of a receive that fetched `count` records.
    #[must_use]
    pub fn consumed(count: usize) -> Self {
        Self {
            status: STATUS_OK.to_owned(),
            records_count: count,
            record_metadata: None,
        }
    }

    /// Summary of a produce that published `metadata.len()` records.
    #[must_use]
    pub fn produced(metadata: Vec<RecordMetadata>) -> Self {
        Self {
            status: STATUS_OK.to_owned(),
            records_count: metadata.len(),
            record_metadata: Some(metadata),
        }
    }
}

/// Every record fetched by a receive, in arrival order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsumedRecords {
    /// Records in poll-arrival order.
    pub records: Vec<BrokerRecord>,
    /// Number of records.
    pub size: usize,
}

impl ConsumedRecords {
    /// Wrap fetched records.
    #[must_use]
    pub fn new(records: Vec<BrokerRecord>) -> Self {
        Self {
            size: records.len(),
            records,
        }
    }
}
