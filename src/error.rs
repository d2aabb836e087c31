//! Fatal error taxonomy for one arm/disarm cycle.

use mavlink::ardupilotmega::MavResult;
use std::time::Duration;
use thiserror::Error;

/// Everything that aborts a run. None of these are retried; the sequencer
/// transitions to `Failed` and the process exits non-zero.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to open vehicle link: {0:#}")]
    Connect(anyhow::Error),

    /// No qualifying message arrived inside the window. Carries the
    /// message type that was being awaited.
    #[error("timed out after {limit:?} waiting for {awaited}")]
    Timeout {
        awaited: &'static str,
        limit: Duration,
    },

    /// An acknowledgment arrived with any result other than ACCEPTED.
    #[error("{command} command rejected by vehicle: {result:?}")]
    Rejected {
        command: &'static str,
        result: MavResult,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),

    /// The session was closed under a pending wait.
    #[error("vehicle link closed")]
    Closed,
}
