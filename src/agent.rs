//! Agent spawns and manages the message processing task

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::decoder::DecoderRegistry;
use crate::device::DeviceManagementClient;
use crate::transport::{InboundMessage, MessageSource, ObjectSink};
use crate::types::SensorEvent;
use crate::{AgentError, Result};

/// Bounded exponential backoff applied to transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
    /// Consecutive failures tolerated before giving up
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_millis(1600),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (1-based): 50ms, 100ms, 200ms, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << exponent).min(self.max_backoff)
    }
}

/// Counters reported when the message loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentStats {
    /// Messages received from the source
    pub received: u64,
    /// Messages decoded and handed to the sink
    pub delivered: u64,
    /// Messages logged and dropped
    pub dropped: u64,
    /// Successful reconnects
    pub reconnects: u64,
}

/// Handle to a running agent task.
pub struct AgentHandle {
    cancel: CancellationToken,
    task: JoinHandle<Result<AgentStats>>,
}

impl AgentHandle {
    /// Ask the message loop to stop after the current message.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the message loop to end.
    ///
    /// Returns `Connection` if the reconnect policy was exhausted.
    pub async fn join(self) -> Result<AgentStats> {
        self.task
            .await
            .map_err(|e| AgentError::connection_failed_with_source("agent task failed", Box::new(e)))?
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Receives uplinks, resolves devices, decodes payloads and forwards objects.
///
/// Decode failures are logged and the message is dropped (and acknowledged);
/// they are never retried. Transport failures are retried under the
/// [`ReconnectPolicy`].
#[derive(Clone)]
pub struct Agent {
    devices: Arc<dyn DeviceManagementClient>,
    registry: DecoderRegistry,
    sink: Arc<dyn ObjectSink>,
    policy: ReconnectPolicy,
}

impl Agent {
    pub fn new(devices: Arc<dyn DeviceManagementClient>, sink: Arc<dyn ObjectSink>) -> Self {
        Self { devices, registry: DecoderRegistry::default(), sink, policy: ReconnectPolicy::default() }
    }

    pub fn with_registry(mut self, registry: DecoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Spawn the message loop for `source`.
    pub fn spawn<S>(self, source: S) -> AgentHandle
    where
        S: MessageSource,
    {
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();
        let task = tokio::spawn(async move { self.run(source, cancel_task).await });
        AgentHandle { cancel, task }
    }

    /// Process one inbound message end to end.
    ///
    /// Returns the number of objects handed to the sink.
    pub async fn handle_message(&self, message: &InboundMessage) -> Result<usize> {
        let event = SensorEvent::from_uplink_json(&message.payload, Utc::now())?;
        let device = self.devices.find_device_from_dev_eui(&event.dev_eui).await?;
        let decoder = self.registry.require(&device.sensor_type)?;

        let objects = decoder.decode(&device.internal_id, &event)?;
        let count = objects.len();

        debug!(
            dev_eui = %event.dev_eui,
            internal_id = %device.internal_id,
            sensor_type = %device.sensor_type,
            objects = count,
            "Decoded uplink"
        );

        self.sink.accept(&device, objects).await?;
        Ok(count)
    }

    async fn run<S>(self, mut source: S, cancel: CancellationToken) -> Result<AgentStats>
    where
        S: MessageSource,
    {
        info!("Agent message loop started");
        let mut stats = AgentStats::default();
        let mut failures = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Agent cancelled");
                    break;
                }
                result = source.next_message() => result,
            };

            match result {
                Ok(Some(message)) => {
                    failures = 0;
                    stats.received += 1;
                    trace!(topic = %message.topic, bytes = message.payload.len(), "Received message");

                    match self.handle_message(&message).await {
                        Ok(_) => stats.delivered += 1,
                        Err(e) => {
                            stats.dropped += 1;
                            warn!(topic = %message.topic, error = %e, "Dropping message");
                        }
                    }

                    if let Err(e) = source.ack(&message).await {
                        warn!(topic = %message.topic, error = %e, "Failed to acknowledge message");
                    }
                }
                Ok(None) => {
                    info!("Message source closed after {} messages", stats.received);
                    break;
                }
                Err(e) => {
                    failures += 1;
                    error!("Transport error ({}/{}): {}", failures, self.policy.max_attempts, e);

                    let mut last_error = e;
                    loop {
                        if failures > self.policy.max_attempts {
                            error!("Too many transport errors, giving up");
                            return Err(AgentError::connection_failed_with_source(
                                format!("giving up after {} consecutive failures", failures),
                                Box::new(last_error),
                            ));
                        }

                        let backoff = self.policy.backoff(failures);
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                info!("Agent cancelled during backoff");
                                return Ok(stats);
                            }
                            _ = tokio::time::sleep(backoff) => {}
                        }

                        match source.reconnect().await {
                            Ok(()) => {
                                stats.reconnects += 1;
                                info!(attempt = failures, "Reconnected to message source");
                                break;
                            }
                            Err(e) => {
                                failures += 1;
                                warn!("Reconnect failed ({}/{}): {}", failures, self.policy.max_attempts, e);
                                last_error = e;
                            }
                        }
                    }
                }
            }
        }

        info!(
            received = stats.received,
            delivered = stats.delivered,
            dropped = stats.dropped,
            "Agent message loop ended"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceInfo, InMemoryDeviceManagementClient, StaticDeviceManagementClient};
    use crate::transport::{ChannelSink, ChannelSource};
    use crate::types::CanonicalObject;
    use futures::StreamExt;

    const DEV_EUI: &str = "a81758fffe0524f2";

    fn uplink(port: u16, data: &str) -> InboundMessage {
        let json = format!(
            r#"{{"devEUI":"{DEV_EUI}","fPort":{port},"data":"{data}","timestamp":"2022-03-01T10:00:00Z"}}"#
        );
        InboundMessage::new(format!("application/53/device/{DEV_EUI}/rx"), json.into_bytes())
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(50));
        assert_eq!(policy.backoff(2), Duration::from_millis(100));
        assert_eq!(policy.backoff(3), Duration::from_millis(200));
        assert_eq!(policy.backoff(6), Duration::from_millis(1600));
        assert_eq!(policy.backoff(7), Duration::from_millis(1600));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_millis(1600));
    }

    #[tokio::test]
    async fn handle_message_decodes_and_forwards() {
        let (sink, mut batches) = ChannelSink::new(4);
        let agent = Agent::new(
            Arc::new(StaticDeviceManagementClient::new("http://dmc")),
            Arc::new(sink),
        );

        // A2 EB 00 -> 23.5 °C
        let count = agent.handle_message(&uplink(2, "ousA")).await.unwrap();
        assert_eq!(count, 1);

        let batch = batches.next().await.unwrap();
        assert_eq!(batch.device.internal_id, "internalID");
        let CanonicalObject::Temperature(t) = &batch.objects[0] else {
            panic!("expected temperature");
        };
        assert_eq!(t.temperature, 23.5);
        assert_eq!(t.device_id, "internalID");
    }

    #[tokio::test]
    async fn handle_message_rejects_wrong_port() {
        let (sink, _batches) = ChannelSink::new(4);
        let agent = Agent::new(Arc::new(StaticDeviceManagementClient::new("")), Arc::new(sink));
        let err = agent.handle_message(&uplink(5, "ousA")).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidPort { found: 5, .. }));

        let err = agent.handle_message(&uplink(300, "ousA")).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidPort { expected: 2, found: 300 }));
    }

    #[tokio::test]
    async fn handle_message_requires_a_registered_decoder() {
        let devices = InMemoryDeviceManagementClient::new();
        devices.insert(DEV_EUI, DeviceInfo::new("x", vec![], "unknown-sensor"));
        let (sink, _batches) = ChannelSink::new(4);
        let agent = Agent::new(Arc::new(devices), Arc::new(sink));

        let err = agent.handle_message(&uplink(2, "ousA")).await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownSensorType { .. }));
    }

    #[tokio::test]
    async fn loop_drops_bad_messages_and_acks_everything() {
        let (tx, source) = ChannelSource::new(8);
        let counters = source.counters();
        let (sink, batches) = ChannelSink::new(8);
        let handle =
            Agent::new(Arc::new(StaticDeviceManagementClient::new("")), Arc::new(sink)).spawn(source);

        tx.send(Ok(uplink(2, "ousA"))).await.unwrap();
        tx.send(Ok(uplink(5, "ousA"))).await.unwrap();
        tx.send(Ok(InboundMessage::new("t", b"garbage".to_vec()))).await.unwrap();
        drop(tx);

        let stats = handle.join().await.unwrap();
        assert_eq!(stats, AgentStats { received: 3, delivered: 1, dropped: 2, reconnects: 0 });
        assert_eq!(counters.acks(), 3);
        assert_eq!(batches.collect::<Vec<_>>().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_reconnects_after_transport_errors() {
        let (tx, source) = ChannelSource::new(8);
        let counters = source.counters();
        let (sink, _batches) = ChannelSink::new(8);
        let handle =
            Agent::new(Arc::new(StaticDeviceManagementClient::new("")), Arc::new(sink)).spawn(source);

        tx.send(Err(AgentError::connection_failed("broker restarted"))).await.unwrap();
        tx.send(Ok(uplink(2, "ousA"))).await.unwrap();
        drop(tx);

        let stats = handle.join().await.unwrap();
        assert_eq!(stats.reconnects, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(counters.reconnects(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_gives_up_after_max_attempts() {
        let (tx, source) = ChannelSource::new(8);
        let (sink, _batches) = ChannelSink::new(8);
        let policy = ReconnectPolicy { max_attempts: 2, ..Default::default() };
        let handle = Agent::new(Arc::new(StaticDeviceManagementClient::new("")), Arc::new(sink))
            .with_reconnect_policy(policy)
            .spawn(source);

        for _ in 0..3 {
            tx.send(Err(AgentError::connection_failed("broker down"))).await.unwrap();
        }

        let err = handle.join().await.unwrap_err();
        assert!(matches!(err, AgentError::Connection { .. }));
        assert!(err.to_string().contains("giving up after 3 consecutive failures"));
    }

    #[tokio::test]
    async fn cancel_stops_an_idle_loop() {
        let (_tx, source) = ChannelSource::new(1);
        let (sink, _batches) = ChannelSink::new(1);
        let handle =
            Agent::new(Arc::new(StaticDeviceManagementClient::new("")), Arc::new(sink)).spawn(source);

        handle.cancel();
        let stats = handle.join().await.unwrap();
        assert_eq!(stats, AgentStats::default());
    }
}
