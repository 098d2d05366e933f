//! Test doubles and fixtures for driving `stepwright` scenarios.
//!
//! Provides a scripted broker ([`ScriptedFactory`], [`RecordingProducer`]),
//! a canned HTTP server bound to a local port ([`CannedHttpServer`]), a
//! serialised [`LoggerHandle`] for log assertions and helpers for reading
//! counters from a [`metrics_util`] debugging recorder.
//!
//! ```rust
//! use stepwright_testing::{ScriptedFactory, records};
//!
//! let factory = ScriptedFactory::new(vec![Ok(records(0, 0..3))]);
//! assert_eq!(factory.journal().subscriptions, 0);
//! ```

pub mod broker;
pub mod http;
pub mod logging;
pub mod metrics;

pub use broker::{Batch, BrokerJournal, RecordingProducer, ScriptedFactory, records};
pub use http::{CannedHttpServer, ReceivedRequest};
pub use logging::{LoggerHandle, logger};
pub use metrics::{counter_value, debugging_recorder};
