//! In-memory transport over tokio channels

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace};

use super::{InboundMessage, MessageSource, ObjectSink};
use crate::device::DeviceInfo;
use crate::types::CanonicalObject;
use crate::{AgentError, Result};

/// Counters shared between a [`ChannelSource`] and its owner.
#[derive(Debug, Clone, Default)]
pub struct SourceCounters {
    acks: Arc<AtomicU64>,
    reconnects: Arc<AtomicU64>,
}

impl SourceCounters {
    pub fn acks(&self) -> u64 {
        self.acks.load(Ordering::Relaxed)
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }
}

/// Message source fed through an mpsc channel.
///
/// Sending an `Err` simulates a connection failure. Dropping every sender
/// closes the source.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Result<InboundMessage>>,
    counters: SourceCounters,
}

impl ChannelSource {
    /// Create a source and the sender that feeds it.
    pub fn new(capacity: usize) -> (mpsc::Sender<Result<InboundMessage>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx, counters: SourceCounters::default() })
    }

    /// Handle to the ack and reconnect counters.
    pub fn counters(&self) -> SourceCounters {
        self.counters.clone()
    }
}

#[async_trait::async_trait]
impl MessageSource for ChannelSource {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        match self.rx.recv().await {
            Some(result) => result.map(Some),
            None => Ok(None),
        }
    }

    async fn ack(&mut self, message: &InboundMessage) -> Result<()> {
        trace!(topic = %message.topic, "ack");
        self.counters.acks.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn reconnect(&mut self) -> Result<()> {
        debug!("Channel source reconnect");
        self.counters.reconnects.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Objects decoded from one uplink.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBatch {
    pub device: DeviceInfo,
    pub objects: Vec<CanonicalObject>,
}

/// Object sink that forwards batches to a stream.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<DecodedBatch>,
}

impl ChannelSink {
    /// Create a sink and the stream its batches arrive on.
    pub fn new(capacity: usize) -> (Self, ReceiverStream<DecodedBatch>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, ReceiverStream::new(rx))
    }
}

#[async_trait::async_trait]
impl ObjectSink for ChannelSink {
    async fn accept(&self, device: &DeviceInfo, objects: Vec<CanonicalObject>) -> Result<()> {
        self.tx
            .send(DecodedBatch { device: device.clone(), objects })
            .await
            .map_err(|_| AgentError::connection_failed("object sink receiver dropped"))
    }
}
