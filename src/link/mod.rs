//! Vehicle link: session, filtered message waits, and the arm/disarm
//! command exchange.

pub mod commands;
pub mod heartbeat;
pub mod session;
pub mod status;
pub mod stream;
#[cfg(test)]
pub mod testing;

use crate::error::LinkError;
use async_trait::async_trait;
use mavlink::ardupilotmega::MavMessage;
use mavlink::MavHeader;
use tokio::sync::broadcast;

pub use session::{MavConnector, MavSession};
pub use stream::Subscription;

/// A received message paired with its routing header.
#[derive(Debug, Clone)]
pub struct Frame {
    pub header: MavHeader,
    pub message: MavMessage,
}

/// A duplex vehicle link: fan-out of inbound messages plus serialized
/// outbound sends. Implemented by the real session and by the test fake.
#[async_trait]
pub trait MessageLink: Send + Sync {
    /// Subscribe to inbound messages. Only messages arriving after the
    /// subscription are delivered.
    fn subscribe(&self) -> broadcast::Receiver<Frame>;

    /// Send one message to the vehicle.
    async fn send(&self, message: MavMessage) -> Result<(), LinkError>;

    /// Stop the session. Idempotent; never fails.
    async fn close(&self);
}

/// Factory for opening a link, so the sequencer can be driven against a
/// fake in tests.
#[async_trait]
pub trait LinkConnector: Send + Sync {
    type Link: MessageLink;

    async fn connect(&self) -> anyhow::Result<Self::Link>;

    /// Human-readable endpoint for logs.
    fn endpoint(&self) -> &str;
}
