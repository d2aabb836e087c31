//! Background logging of vehicle STATUSTEXT messages.
//!
//! Autopilots narrate arming and pre-arm failures over STATUSTEXT
//! ("Arming motors", "PreArm: ..."), which is worth surfacing while the
//! sequence runs.

use crate::link::{Frame, MessageLink};
use mavlink::ardupilotmega::{MavMessage, MavSeverity, STATUSTEXT_DATA};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Extract the printable text, dropping the fixed-buffer NUL padding.
pub fn status_text(status: &STATUSTEXT_DATA) -> String {
    String::from_utf8_lossy(&status.text)
        .trim_end_matches('\0')
        .to_string()
}

fn log_status(status: &STATUSTEXT_DATA) {
    let text = status_text(status);
    match status.severity {
        MavSeverity::MAV_SEVERITY_EMERGENCY
        | MavSeverity::MAV_SEVERITY_ALERT
        | MavSeverity::MAV_SEVERITY_CRITICAL
        | MavSeverity::MAV_SEVERITY_ERROR => error!(severity = ?status.severity, "[vehicle] {text}"),
        MavSeverity::MAV_SEVERITY_WARNING => warn!("[vehicle] {text}"),
        MavSeverity::MAV_SEVERITY_NOTICE | MavSeverity::MAV_SEVERITY_INFO => {
            info!("[vehicle] {text}")
        }
        MavSeverity::MAV_SEVERITY_DEBUG => debug!("[vehicle] {text}"),
    }
}

/// Spawn a task that logs STATUSTEXT traffic until the link closes or the
/// handle is aborted.
pub fn spawn_status_logger<L: MessageLink>(link: &L) -> JoinHandle<()> {
    let mut inbound = link.subscribe();
    tokio::spawn(async move {
        loop {
            match inbound.recv().await {
                Ok(Frame {
                    message: MavMessage::STATUSTEXT(status),
                    ..
                }) => log_status(&status),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
