//! Arm/disarm command dispatch with ack correlation.

use crate::config::ConnectionOptions;
use crate::error::LinkError;
use crate::link::{MessageLink, Subscription};
use mavlink::ardupilotmega::{MavCmd, MavMessage, MavResult, COMMAND_ACK_DATA, COMMAND_LONG_DATA};
use tracing::{debug, info};

fn command_name(arm: bool) -> &'static str {
    if arm {
        "arm"
    } else {
        "disarm"
    }
}

/// Send COMPONENT_ARM_DISARM to the configured target and wait for its
/// acknowledgment. The force parameter is applied only when arming;
/// disarm always sends force 0 so it cannot bypass safety interlocks.
///
/// Any result other than ACCEPTED fails the run. There is no retry.
pub async fn send_arm_disarm<L: MessageLink>(
    link: &L,
    options: &ConnectionOptions,
    arm: bool,
) -> Result<(), LinkError> {
    let command = MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
        target_system: options.target_system,
        target_component: options.target_component,
        command: MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
        confirmation: 0,
        param1: if arm { 1.0 } else { 0.0 },
        param2: if arm { options.force_param } else { 0.0 },
        param3: 0.0,
        param4: 0.0,
        param5: 0.0,
        param6: 0.0,
        param7: 0.0,
    });

    info!(
        command = command_name(arm),
        target_system = options.target_system,
        target_component = options.target_component,
        force = if arm { options.force_param } else { 0.0 },
        "sending arm/disarm command"
    );

    // Subscribe before sending so a fast ack cannot be missed.
    let acks = Subscription::to(link);
    link.send(command).await?;

    let ack: COMMAND_ACK_DATA = acks
        .wait_for("COMMAND_ACK", options.ack_timeout(), |frame| {
            match frame.message {
                MavMessage::COMMAND_ACK(ack)
                    if ack.command == MavCmd::MAV_CMD_COMPONENT_ARM_DISARM =>
                {
                    Some(ack)
                }
                _ => None,
            }
        })
        .await?;

    if ack.result != MavResult::MAV_RESULT_ACCEPTED {
        return Err(LinkError::Rejected {
            command: command_name(arm),
            result: ack.result,
        });
    }

    debug!(command = command_name(arm), "command accepted");
    Ok(())
}
