//! Connection options, parsed once at startup from flags and environment.

use clap::Parser;
use std::time::Duration;

/// Arm a MAVLink vehicle, hold, then disarm, confirming each step.
#[derive(Parser, Debug, Clone)]
#[command(name = "mavarm", version)]
pub struct ConnectionOptions {
    /// Remote host the vehicle listens on (used when --local-port is 0).
    #[arg(long, env = "MAVARM_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// UDP port to send to on the remote host.
    #[arg(long = "remote-port", env = "MAVARM_REMOTE_PORT", default_value_t = 14551)]
    pub send_port: u16,

    /// Local UDP port to listen on. Pass 0 to connect out to
    /// host:remote-port instead of listening.
    #[arg(long = "local-port", env = "MAVARM_LOCAL_PORT", default_value_t = 14550)]
    pub listen_port: u16,

    /// System id of the target autopilot.
    #[arg(long = "target-system", env = "MAVARM_TARGET_SYSTEM", default_value_t = 1)]
    pub target_system: u8,

    /// Component id of the target autopilot.
    #[arg(long = "target-component", env = "MAVARM_TARGET_COMPONENT", default_value_t = 1)]
    pub target_component: u8,

    /// Our own system id on the link.
    #[arg(long = "system-id", env = "MAVARM_SYSTEM_ID", default_value_t = 255)]
    pub system_id: u8,

    /// Our own component id on the link (190 = onboard computer).
    #[arg(long = "component-id", env = "MAVARM_COMPONENT_ID", default_value_t = 190)]
    pub component_id: u8,

    /// How long to wait for the first heartbeat, in milliseconds.
    #[arg(long = "heartbeat-timeout", env = "MAVARM_HEARTBEAT_TIMEOUT", value_name = "MS", default_value_t = 10_000)]
    pub heartbeat_timeout_ms: u64,

    /// How long to wait for a command acknowledgment, in milliseconds.
    #[arg(long = "ack-timeout", env = "MAVARM_ACK_TIMEOUT", value_name = "MS", default_value_t = 5_000)]
    pub ack_timeout_ms: u64,

    /// How long to wait for the armed/disarmed state to show up in a
    /// heartbeat, in milliseconds.
    #[arg(long = "state-timeout", env = "MAVARM_STATE_TIMEOUT", value_name = "MS", default_value_t = 10_000)]
    pub state_timeout_ms: u64,

    /// How long to stay armed before disarming, in milliseconds.
    #[arg(long = "disarm-delay", env = "MAVARM_DISARM_DELAY", value_name = "MS", default_value_t = 5_000)]
    pub disarm_delay_ms: u64,

    /// Force parameter for the arm command (21196 bypasses pre-arm
    /// checks). Never applied on disarm.
    #[arg(long = "force-param", env = "MAVARM_FORCE_PARAM", default_value_t = 0.0)]
    pub force_param: f32,
}

impl ConnectionOptions {
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    pub fn state_timeout(&self) -> Duration {
        Duration::from_millis(self.state_timeout_ms)
    }

    pub fn disarm_delay(&self) -> Duration {
        Duration::from_millis(self.disarm_delay_ms)
    }

    /// Endpoint string for `mavlink::connect`. A listen port selects
    /// listening mode (SITL and MavProxy broadcast to it); a zero listen
    /// port connects out to the remote host instead.
    pub fn connection_string(&self) -> String {
        if self.listen_port != 0 {
            format!("udpin:0.0.0.0:{}", self.listen_port)
        } else {
            format!("udpout:{}:{}", self.host, self.send_port)
        }
    }
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            send_port: 14551,
            listen_port: 14550,
            target_system: 1,
            target_component: 1,
            system_id: 255,
            component_id: 190,
            heartbeat_timeout_ms: 10_000,
            ack_timeout_ms: 5_000,
            state_timeout_ms: 10_000,
            disarm_delay_ms: 5_000,
            force_param: 0.0,
        }
    }
}
