//! Arm/disarm sequence states and the transitions between them.

use std::fmt;

/// States of one arm/disarm cycle, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// Opening the vehicle link.
    Connecting,
    /// Waiting for proof of life.
    AwaitingHeartbeat,
    /// Arm command sent, waiting for its ack.
    Arming,
    /// Waiting for a heartbeat that shows the armed bit.
    ConfirmingArmed,
    /// Armed; holding for the configured delay.
    Holding,
    /// Disarm command sent, waiting for its ack.
    Disarming,
    /// Waiting for a heartbeat with the armed bit clear.
    ConfirmingDisarmed,
    /// Link released. Terminal.
    Closed,
    /// Aborted on timeout, rejection, or transport error. Terminal.
    Failed,
}

impl SequenceState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SequenceState::Closed | SequenceState::Failed)
    }
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SequenceState::Connecting => "connecting",
            SequenceState::AwaitingHeartbeat => "awaiting-heartbeat",
            SequenceState::Arming => "arming",
            SequenceState::ConfirmingArmed => "confirming-armed",
            SequenceState::Holding => "holding",
            SequenceState::Disarming => "disarming",
            SequenceState::ConfirmingDisarmed => "confirming-disarmed",
            SequenceState::Closed => "closed",
            SequenceState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Whether the sequencer may move from `from` to `to`. The happy path is
/// strictly ordered; failure is reachable from any non-terminal state, and
/// so is `Closed`, because cancellation closes the link from wherever the
/// sequence happens to be.
pub fn is_valid_transition(from: SequenceState, to: SequenceState) -> bool {
    use SequenceState::*;

    match (from, to) {
        (from, Failed) => !from.is_terminal(),
        (from, Closed) => !from.is_terminal(),

        (Connecting, AwaitingHeartbeat) => true,
        (AwaitingHeartbeat, Arming) => true,
        (Arming, ConfirmingArmed) => true,
        (ConfirmingArmed, Holding) => true,
        (Holding, Disarming) => true,
        (Disarming, ConfirmingDisarmed) => true,

        _ => false,
    }
}
