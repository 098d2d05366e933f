//! Publishing step payloads to a topic.

use serde::Deserialize;
use serde_json::Value;

use super::{BrokerProducer, DeliveryStatus, ProduceError, ProducerRecord};
use crate::{metrics, state::parse_lenient};

#[derive(Deserialize)]
struct ProduceRequest {
    records: Vec<ProducerRecord>,
}

/// Publish the records described by `request` to `topic`.
///
/// A request of the form `{"records": [{"key", "value", "partition"}]}`
/// publishes each record in order; any other payload is published as the
/// value of a single keyless record.
///
/// # Errors
///
/// Returns [`ProduceError::InvalidRecords`] without publishing anything when
/// a `records` field is present but is not a list of records. Otherwise
/// returns the first error raised by the producer; records before it have
/// already been published.
pub async fn produce<P>(producer: &P, topic: &str, request: &str) -> Result<DeliveryStatus, ProduceError>
where
    P: BrokerProducer + ?Sized,
{
    let mut metadata = Vec::new();
    for record in records_from(request)? {
        metadata.push(producer.send(topic, record).await?);
    }
    metrics::add_records_produced(metadata.len());
    Ok(DeliveryStatus::produced(metadata))
}

fn records_from(request: &str) -> Result<Vec<ProducerRecord>, ProduceError> {
    let payload = parse_lenient(request);
    if let Value::Object(fields) = &payload
        && fields.contains_key("records")
    {
        let parsed: ProduceRequest =
            serde_json::from_value(payload).map_err(ProduceError::InvalidRecords)?;
        return Ok(parsed.records);
    }
    Ok(vec![ProducerRecord {
        key: None,
        value: payload,
        partition: None,
    }])
}
