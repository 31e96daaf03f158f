//! End-to-end agent runs over scripted message sources.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::{Result, ensure};
use futures::StreamExt;
use iot_agent::device::InMemoryDeviceManagementClient;
use iot_agent::transport::{ChannelSink, ChannelSource, InboundMessage, MessageSource};
use iot_agent::{Agent, AgentError, AgentStats, CanonicalObject, DeviceInfo, ReconnectPolicy};

// base64 of A2 EB 00 (23.5 °C)
const TEMPERATURE_FRAME: &str = "ousA";

fn uplink(dev_eui: &str, data: &str) -> InboundMessage {
    let json = format!(
        r#"{{"devEUI":"{dev_eui}","fPort":2,"data":"{data}","timestamp":"2022-03-01T10:00:00Z"}}"#
    );
    InboundMessage::new(format!("application/53/device/{dev_eui}/rx"), json.into_bytes())
}

fn devices() -> InMemoryDeviceManagementClient {
    [
        ("A81758FFFE0524F2".to_string(), DeviceInfo::new("tank-1", vec![], "axsensor")),
        ("a81758fffe0524f3".to_string(), DeviceInfo::new("tank-2", vec![], "axsensor")),
    ]
    .into_iter()
    .collect()
}

enum Step {
    Message(InboundMessage),
    Fail,
}

/// Source replaying a script, whose reconnects fail a fixed number of times.
struct ScriptedSource {
    steps: VecDeque<Step>,
    failing_reconnects: u32,
    reconnect_calls: Arc<AtomicU32>,
}

#[async_trait::async_trait]
impl MessageSource for ScriptedSource {
    async fn next_message(&mut self) -> iot_agent::Result<Option<InboundMessage>> {
        match self.steps.pop_front() {
            Some(Step::Message(message)) => Ok(Some(message)),
            Some(Step::Fail) => Err(AgentError::connection_failed("connection reset")),
            None => Ok(None),
        }
    }

    async fn ack(&mut self, _message: &InboundMessage) -> iot_agent::Result<()> {
        Ok(())
    }

    async fn reconnect(&mut self) -> iot_agent::Result<()> {
        self.reconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_reconnects > 0 {
            self.failing_reconnects -= 1;
            return Err(AgentError::connection_failed("broker unavailable"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn routes_uplinks_to_their_devices() -> Result<()> {
    let (tx, source) = ChannelSource::new(8);
    let (sink, batches) = ChannelSink::new(8);
    let handle = Agent::new(Arc::new(devices()), Arc::new(sink)).spawn(source);

    tx.send(Ok(uplink("a81758fffe0524f2", TEMPERATURE_FRAME))).await?;
    tx.send(Ok(uplink("a81758fffe0524f3", TEMPERATURE_FRAME))).await?;
    tx.send(Ok(uplink("0000000000000000", TEMPERATURE_FRAME))).await?;
    drop(tx);

    let stats = handle.join().await?;
    ensure!(stats == AgentStats { received: 3, delivered: 2, dropped: 1, reconnects: 0 });

    let ids: Vec<String> = batches
        .map(|batch| match &batch.objects[..] {
            [CanonicalObject::Temperature(t)] => t.device_id.clone(),
            other => format!("unexpected {other:?}"),
        })
        .collect()
        .await;
    ensure!(ids == ["tank-1", "tank-2"], "got {ids:?}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn recovers_when_reconnect_eventually_succeeds() -> Result<()> {
    let calls = Arc::new(AtomicU32::new(0));
    let source = ScriptedSource {
        steps: VecDeque::from([Step::Fail, Step::Message(uplink("a81758fffe0524f2", TEMPERATURE_FRAME))]),
        failing_reconnects: 2,
        reconnect_calls: Arc::clone(&calls),
    };
    let (sink, _batches) = ChannelSink::new(8);

    let started = tokio::time::Instant::now();
    let stats = Agent::new(Arc::new(devices()), Arc::new(sink)).spawn(source).join().await?;

    ensure!(calls.load(Ordering::SeqCst) == 3);
    ensure!(stats.reconnects == 1 && stats.delivered == 1);
    // 50ms + 100ms + 200ms of backoff
    ensure!(started.elapsed() >= Duration::from_millis(350));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reports_a_connection_error_when_reconnects_are_exhausted() -> Result<()> {
    let calls = Arc::new(AtomicU32::new(0));
    let source = ScriptedSource {
        steps: VecDeque::from([Step::Fail]),
        failing_reconnects: u32::MAX,
        reconnect_calls: Arc::clone(&calls),
    };
    let (sink, _batches) = ChannelSink::new(1);
    let policy = ReconnectPolicy { max_attempts: 4, ..Default::default() };

    let err = Agent::new(Arc::new(devices()), Arc::new(sink))
        .with_reconnect_policy(policy)
        .spawn(source)
        .join()
        .await
        .unwrap_err();

    ensure!(matches!(err, AgentError::Connection { .. }), "got {err}");
    ensure!(err.is_retryable());
    ensure!(calls.load(Ordering::SeqCst) == 4);
    Ok(())
}
