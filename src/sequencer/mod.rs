//! The arm/disarm sequencer: drives the states in order, one bounded wait
//! at a time, racing every wait against the shutdown token.

pub mod state;

use crate::config::ConnectionOptions;
use crate::error::LinkError;
use crate::link::{commands, heartbeat, status, LinkConnector, MessageLink};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use state::SequenceState;

/// How a run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The full cycle ran: armed, held, disarmed, confirmed, closed.
    Completed,
    /// A shutdown signal arrived first; the link was closed and the
    /// sequence abandoned wherever it was.
    Interrupted,
}

pub struct Sequencer<C: LinkConnector> {
    connector: C,
    options: ConnectionOptions,
    shutdown: CancellationToken,
    state: SequenceState,
}

impl<C: LinkConnector> Sequencer<C> {
    pub fn new(connector: C, options: ConnectionOptions, shutdown: CancellationToken) -> Self {
        Self {
            connector,
            options,
            shutdown,
            state: SequenceState::Connecting,
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    fn advance(&mut self, next: SequenceState) {
        debug_assert!(
            state::is_valid_transition(self.state, next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        info!(from = %self.state, to = %next, "sequence state");
        self.state = next;
    }

    /// Run one full cycle. The link is closed on every exit path;
    /// cancellation wins every race it enters.
    pub async fn run(&mut self) -> Result<CycleOutcome, LinkError> {
        info!(endpoint = self.connector.endpoint(), "opening vehicle link");
        let cancel = self.shutdown.clone();

        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            link = self.connector.connect() => Some(link),
        };
        let link = match connected {
            None => {
                info!("shutdown requested before the link opened");
                self.advance(SequenceState::Closed);
                return Ok(CycleOutcome::Interrupted);
            }
            Some(Err(err)) => {
                self.advance(SequenceState::Failed);
                return Err(LinkError::Connect(err));
            }
            Some(Ok(link)) => link,
        };

        let status_logger = status::spawn_status_logger(&link);

        let raced = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.cycle(&link) => Some(result),
        };

        status_logger.abort();

        let outcome = match raced {
            None => {
                info!("shutdown requested, abandoning sequence and closing the link");
                self.advance(SequenceState::Closed);
                Ok(CycleOutcome::Interrupted)
            }
            Some(Ok(())) => {
                self.advance(SequenceState::Closed);
                Ok(CycleOutcome::Completed)
            }
            Some(Err(err)) => {
                self.advance(SequenceState::Failed);
                Err(err)
            }
        };

        link.close().await;
        outcome
    }

    async fn cycle(&mut self, link: &C::Link) -> Result<(), LinkError> {
        self.advance(SequenceState::AwaitingHeartbeat);
        info!(
            timeout_ms = self.options.heartbeat_timeout_ms,
            "waiting for heartbeat"
        );
        let (source, _) =
            heartbeat::wait_for_heartbeat(link, self.options.heartbeat_timeout()).await?;
        info!(
            system = source.system_id,
            component = source.component_id,
            "heartbeat received"
        );

        self.advance(SequenceState::Arming);
        commands::send_arm_disarm(link, &self.options, true).await?;

        self.advance(SequenceState::ConfirmingArmed);
        info!(
            timeout_ms = self.options.state_timeout_ms,
            "waiting for armed state"
        );
        heartbeat::wait_for_arm_state(link, true, self.options.state_timeout()).await?;
        info!("ARMED");

        self.advance(SequenceState::Holding);
        info!(
            hold_ms = self.options.disarm_delay_ms,
            "holding before disarm"
        );
        time::sleep(self.options.disarm_delay()).await;

        self.advance(SequenceState::Disarming);
        commands::send_arm_disarm(link, &self.options, false).await?;

        self.advance(SequenceState::ConfirmingDisarmed);
        info!(
            timeout_ms = self.options.state_timeout_ms,
            "waiting for disarmed state"
        );
        heartbeat::wait_for_arm_state(link, false, self.options.state_timeout()).await?;
        info!("DISARMED");

        Ok(())
    }
}
