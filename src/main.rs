mod config;
mod error;
mod link;
mod sequencer;
mod shutdown;

use clap::Parser;
use config::ConnectionOptions;
use link::MavConnector;
use sequencer::{CycleOutcome, Sequencer};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let options = ConnectionOptions::parse();
    let shutdown = shutdown::install();

    info!(
        endpoint = %options.connection_string(),
        target_system = options.target_system,
        target_component = options.target_component,
        "starting arm/disarm cycle"
    );

    let connector = MavConnector::new(
        options.connection_string(),
        options.system_id,
        options.component_id,
    );
    let mut sequencer = Sequencer::new(connector, options, shutdown);

    match sequencer.run().await {
        Ok(CycleOutcome::Completed) => info!("arm/disarm cycle complete"),
        Ok(CycleOutcome::Interrupted) => info!("interrupted, connection closed"),
        Err(err) => {
            error!(state = %sequencer.state(), "arm/disarm cycle failed: {err}");
            std::process::exit(1);
        }
    }
}
