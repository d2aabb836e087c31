//! Heartbeat observation: proof of life and the armed bit.

use crate::error::LinkError;
use crate::link::{MessageLink, Subscription};
use mavlink::ardupilotmega::{MavMessage, MavModeFlag, HEARTBEAT_DATA};
use mavlink::MavHeader;
use std::time::Duration;

/// Whether the heartbeat reports the vehicle as armed.
pub fn is_armed(heartbeat: &HEARTBEAT_DATA) -> bool {
    heartbeat
        .base_mode
        .contains(MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED)
}

/// Wait for the first heartbeat from any source, returning it with its
/// routing header so the caller can log who is talking.
pub async fn wait_for_heartbeat<L: MessageLink>(
    link: &L,
    limit: Duration,
) -> Result<(MavHeader, HEARTBEAT_DATA), LinkError> {
    Subscription::to(link)
        .wait_for("HEARTBEAT", limit, |frame| match frame.message {
            MavMessage::HEARTBEAT(heartbeat) => Some((frame.header, heartbeat)),
            _ => None,
        })
        .await
}

/// Wait until a heartbeat reports the requested armed state. Heartbeats in
/// the other state keep the wait pending. The first heartbeat already in
/// the requested state satisfies the wait; this observes state, it does
/// not detect a transition.
pub async fn wait_for_arm_state<L: MessageLink>(
    link: &L,
    armed: bool,
    limit: Duration,
) -> Result<(), LinkError> {
    Subscription::to(link)
        .wait_for("HEARTBEAT", limit, |frame| match frame.message {
            MavMessage::HEARTBEAT(heartbeat) if is_armed(&heartbeat) == armed => Some(()),
            _ => None,
        })
        .await
}
