//! The real vehicle session over `mavlink::connect`.
//!
//! The mavlink crate supplies framing, encoding, and the message registry;
//! this module only moves frames between the blocking connection and the
//! async world. A dedicated reader thread feeds a broadcast channel that
//! every pending wait subscribes to.

use crate::error::LinkError;
use crate::link::{Frame, LinkConnector, MessageLink};
use anyhow::Context;
use async_trait::async_trait;
use mavlink::ardupilotmega::MavMessage;
use mavlink::error::MessageReadError;
use mavlink::{MavConnection, MavHeader};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const INBOUND_CAPACITY: usize = 256;

type Connection = Arc<Box<dyn MavConnection<MavMessage> + Send + Sync>>;

pub struct MavSession {
    conn: Connection,
    header: MavHeader,
    inbound: broadcast::Sender<Frame>,
    closed: CancellationToken,
}

impl MavSession {
    /// Open the endpoint and start the reader thread.
    pub async fn open(address: &str, system_id: u8, component_id: u8) -> anyhow::Result<Self> {
        let endpoint = address.to_string();
        let conn = tokio::task::spawn_blocking(move || mavlink::connect::<MavMessage>(&endpoint))
            .await
            .context("connect task panicked")?
            .with_context(|| format!("opening {address}"))?;
        let conn: Connection = Arc::new(conn);

        let (inbound, _) = broadcast::channel(INBOUND_CAPACITY);
        let closed = CancellationToken::new();

        let reader_conn = conn.clone();
        let reader_tx = inbound.clone();
        let reader_closed = closed.clone();
        std::thread::Builder::new()
            .name("mavlink-rx".into())
            .spawn(move || read_loop(reader_conn, reader_tx, reader_closed))
            .context("spawning reader thread")?;

        info!(endpoint = address, "vehicle link open");
        Ok(Self {
            conn,
            header: MavHeader {
                system_id,
                component_id,
                sequence: 0,
            },
            inbound,
            closed,
        })
    }
}

fn read_loop(conn: Connection, tx: broadcast::Sender<Frame>, closed: CancellationToken) {
    while !closed.is_cancelled() {
        match conn.recv() {
            Ok((header, message)) => {
                // No subscribers is fine; waits subscribe when they start.
                let _ = tx.send(Frame { header, message });
            }
            // A frame with no registered decoder never disturbs a pending
            // wait; log it and move on.
            Err(MessageReadError::Parse(err)) => {
                debug!(error = %err, "ignoring undecodable frame");
            }
            Err(MessageReadError::Io(ref err))
                if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(MessageReadError::Io(err)) => {
                if !closed.is_cancelled() {
                    warn!(error = %err, "vehicle link receive failed, stopping reader");
                }
                break;
            }
        }
    }
    debug!("reader thread stopped");
}

#[async_trait]
impl MessageLink for MavSession {
    fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.inbound.subscribe()
    }

    async fn send(&self, message: MavMessage) -> Result<(), LinkError> {
        if self.closed.is_cancelled() {
            return Err(LinkError::Closed);
        }
        self.conn
            .send(&self.header, &message)
            .map_err(|err| LinkError::Transport(std::io::Error::other(err)))?;
        Ok(())
    }

    async fn close(&self) {
        // Cancelling twice is a no-op, which makes close idempotent.
        self.closed.cancel();
    }
}

/// Opens `MavSession`s for the sequencer.
pub struct MavConnector {
    address: String,
    system_id: u8,
    component_id: u8,
}

impl MavConnector {
    pub fn new(address: String, system_id: u8, component_id: u8) -> Self {
        Self {
            address,
            system_id,
            component_id,
        }
    }
}

#[async_trait]
impl LinkConnector for MavConnector {
    type Link = MavSession;

    async fn connect(&self) -> anyhow::Result<MavSession> {
        MavSession::open(&self.address, self.system_id, self.component_id).await
    }

    fn endpoint(&self) -> &str {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::testing::heartbeat_frame;

    // udpout binds an ephemeral local port and needs no peer, so a real
    // session can be exercised without a vehicle.
    #[tokio::test]
    async fn close_is_idempotent() {
        let session = MavSession::open("udpout:127.0.0.1:14599", 255, 190)
            .await
            .expect("udpout open needs no peer");
        session.close().await;
        session.close().await;

        let err = session
            .send(heartbeat_frame(false).message)
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::Closed));
    }

    #[tokio::test]
    async fn connector_reports_its_endpoint() {
        let connector = MavConnector::new("udpout:127.0.0.1:14599".into(), 255, 190);
        assert_eq!(connector.endpoint(), "udpout:127.0.0.1:14599");
    }
}
