//! Test doubles for the vehicle link: an in-memory `MessageLink`, a
//! connector for it, and frame builders.

use crate::error::LinkError;
use crate::link::{Frame, LinkConnector, MessageLink};
use async_trait::async_trait;
use mavlink::ardupilotmega::{
    MavAutopilot, MavCmd, MavMessage, MavModeFlag, MavResult, MavState, MavType,
    COMMAND_ACK_DATA, HEARTBEAT_DATA,
};
use mavlink::MavHeader;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// A heartbeat as the target autopilot (system 1, component 1) would send
/// it, with the armed bit set as requested.
pub fn heartbeat_frame(armed: bool) -> Frame {
    let base_mode = if armed {
        MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED
    } else {
        MavModeFlag::empty()
    };
    Frame {
        header: MavHeader {
            system_id: 1,
            component_id: 1,
            sequence: 0,
        },
        message: MavMessage::HEARTBEAT(HEARTBEAT_DATA {
            custom_mode: 0,
            mavtype: MavType::MAV_TYPE_QUADROTOR,
            autopilot: MavAutopilot::MAV_AUTOPILOT_ARDUPILOTMEGA,
            base_mode,
            system_status: MavState::MAV_STATE_STANDBY,
            mavlink_version: 3,
        }),
    }
}

/// An acknowledgment for `command` with the given result.
pub fn ack_frame(command: MavCmd, result: MavResult) -> Frame {
    Frame {
        header: MavHeader {
            system_id: 1,
            component_id: 1,
            sequence: 0,
        },
        message: MavMessage::COMMAND_ACK(COMMAND_ACK_DATA { command, result }),
    }
}

/// In-memory link. Tests inject inbound frames and observe what was sent.
pub struct FakeLink {
    inbound: broadcast::Sender<Frame>,
    outbound: broadcast::Sender<MavMessage>,
    sent: Mutex<Vec<MavMessage>>,
    close_calls: AtomicUsize,
    closed: AtomicBool,
}

impl FakeLink {
    pub fn new() -> Self {
        let (inbound, _) = broadcast::channel(64);
        let (outbound, _) = broadcast::channel(64);
        Self {
            inbound,
            outbound,
            sent: Mutex::new(Vec::new()),
            close_calls: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Deliver a frame to current subscribers. Frames injected before a
    /// wait subscribes are dropped, like real traffic would be.
    pub fn inject(&self, frame: Frame) {
        let _ = self.inbound.send(frame);
    }

    /// Everything sent through the link so far.
    pub fn sent(&self) -> Vec<MavMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Observe future sends as they happen.
    pub fn outbound(&self) -> broadcast::Receiver<MavMessage> {
        self.outbound.subscribe()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageLink for FakeLink {
    fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.inbound.subscribe()
    }

    async fn send(&self, message: MavMessage) -> Result<(), LinkError> {
        if self.is_closed() {
            return Err(LinkError::Closed);
        }
        self.sent.lock().unwrap().push(message.clone());
        let _ = self.outbound.send(message);
        Ok(())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Hands out an already-built `FakeLink`.
pub struct FakeConnector {
    link: Mutex<Option<Arc<FakeLink>>>,
    endpoint: String,
}

impl FakeConnector {
    pub fn new(link: Arc<FakeLink>) -> Self {
        Self {
            link: Mutex::new(Some(link)),
            endpoint: "fake:vehicle".into(),
        }
    }

    /// A connector whose connect() fails, for the Connecting → Failed path.
    pub fn broken() -> Self {
        Self {
            link: Mutex::new(None),
            endpoint: "fake:unreachable".into(),
        }
    }
}

#[async_trait]
impl LinkConnector for FakeConnector {
    type Link = Arc<FakeLink>;

    async fn connect(&self) -> anyhow::Result<Arc<FakeLink>> {
        self.link
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow::anyhow!("vehicle unreachable"))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MessageLink for Arc<FakeLink> {
    fn subscribe(&self) -> broadcast::Receiver<Frame> {
        (**self).subscribe()
    }

    async fn send(&self, message: MavMessage) -> Result<(), LinkError> {
        (**self).send(message).await
    }

    async fn close(&self) {
        (**self).close().await
    }
}
