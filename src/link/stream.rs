//! Filtered waits over the inbound message stream.
//!
//! One `Subscription` is one pending wait: it holds a broadcast receiver
//! from the moment it is created, so a reply cannot slip through between a
//! send and the wait for its answer. Dropping the subscription is the
//! unsubscribe, and it happens on every resolution path.

use crate::error::LinkError;
use crate::link::{Frame, MessageLink};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;
use tracing::warn;

pub struct Subscription {
    rx: broadcast::Receiver<Frame>,
}

impl Subscription {
    /// Start observing the link now.
    pub fn to<L: MessageLink + ?Sized>(link: &L) -> Self {
        Self {
            rx: link.subscribe(),
        }
    }

    /// Wait until `filter` accepts a frame, or until `limit` elapses.
    ///
    /// The filter is re-evaluated for every frame; frames it declines keep
    /// the wait pending. `awaited` names the expected message type in the
    /// timeout error.
    pub async fn wait_for<F, T>(
        mut self,
        awaited: &'static str,
        limit: Duration,
        mut filter: F,
    ) -> Result<T, LinkError>
    where
        F: FnMut(Frame) -> Option<T> + Send,
        T: Send,
    {
        let matched = async {
            loop {
                match self.rx.recv().await {
                    Ok(frame) => {
                        if let Some(found) = filter(frame) {
                            return Ok(found);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(awaited, skipped, "inbound stream lagged, frames dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return Err(LinkError::Closed),
                }
            }
        };

        match time::timeout(limit, matched).await {
            Ok(result) => result,
            Err(_) => Err(LinkError::Timeout { awaited, limit }),
        }
    }
}
