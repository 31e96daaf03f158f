//! Transport boundary between the agent and the message broker.
//!
//! The broker client itself lives outside this crate. It plugs in through
//! [`MessageSource`] (inbound uplinks) and the agent hands decoded objects to
//! an [`ObjectSink`]. [`channel`] provides in-memory implementations of both.

pub mod channel;

pub use channel::{ChannelSink, ChannelSource, DecodedBatch, SourceCounters};

use crate::Result;
use crate::device::DeviceInfo;
use crate::types::CanonicalObject;

/// One message received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Topic the message was published on
    pub topic: String,
    /// Uplink document as delivered by the network server
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self { topic: topic.into(), payload: payload.into() }
    }
}

/// Source of inbound broker messages.
#[async_trait::async_trait]
pub trait MessageSource: Send + 'static {
    /// Get the next message
    ///
    /// Returns:
    /// - `Ok(Some(message))` - message available
    /// - `Ok(None)` - source closed (normal termination)
    /// - `Err(e)` - connection failure; the agent backs off and calls [`reconnect`](Self::reconnect)
    async fn next_message(&mut self) -> Result<Option<InboundMessage>>;

    /// Acknowledge a processed message. Must be idempotent.
    async fn ack(&mut self, message: &InboundMessage) -> Result<()>;

    /// Re-establish the connection after a failure.
    async fn reconnect(&mut self) -> Result<()>;
}

/// Receiver of decoded objects.
#[async_trait::async_trait]
pub trait ObjectSink: Send + Sync + 'static {
    /// Accept the ordered objects decoded from one uplink.
    async fn accept(&self, device: &DeviceInfo, objects: Vec<CanonicalObject>) -> Result<()>;
}
