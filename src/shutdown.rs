//! Bridges process termination signals to a cancellation token.
//!
//! The sequencer only ever sees the token, so its cancellation behavior is
//! testable without delivering real signals.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Install SIGINT/SIGTERM handling and return the token the sequencer
/// should race against. The first signal cancels the token; repeated
/// signals while shutdown is in progress do nothing.
pub fn install() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        loop {
            wait_for_signal().await;
            if trigger.is_cancelled() {
                debug!("shutdown already in progress, ignoring signal");
                continue;
            }
            info!("termination signal received, closing connection");
            trigger.cancel();
        }
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(err) => {
            warn!(error = %err, "SIGTERM handler unavailable, falling back to ctrl-c");
            ctrl_c_or_park().await;
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c_or_park() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c_or_park().await;
}

async fn ctrl_c_or_park() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // Without a working handler there is nothing to wait for; park so
        // the listener does not spin.
        warn!(error = %err, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}
