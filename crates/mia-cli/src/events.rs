//! Reaction to gateway events.

use colored::Colorize;
use mia_client::{EventReceiver, GatewayEvent};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Print a notice whenever the service rejects the session. The task ends
/// once every gateway handle is dropped.
pub fn spawn_listener(mut events: EventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(GatewayEvent::LoginRequired { path }) => {
                    debug!(path = %path, "Login required");
                    eprintln!(
                        "{} Your session has expired. Please log in again with {}.",
                        "!".yellow().bold(),
                        "mia login".cyan()
                    );
                }
                Ok(event) => debug!(?event, "Gateway event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Gateway events lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Wait for the listener to drain. Returns `false` if the task failed.
pub async fn join_listener(listener: JoinHandle<()>) -> bool {
    match listener.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Gateway event listener failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mia_client::events::create_event_channel;

    #[tokio::test]
    async fn test_listener_ends_when_channel_closes() {
        let sender = create_event_channel();
        let listener = spawn_listener(sender.subscribe());
        sender
            .send(GatewayEvent::LoginRequired {
                path: "/patients/".to_string(),
            })
            .unwrap();
        drop(sender);

        assert!(join_listener(listener).await);
    }

    #[tokio::test]
    async fn test_failed_listener_is_reported() {
        let listener = tokio::spawn(async { panic!("listener crashed"); });
        assert!(!join_listener(listener).await);
    }
}
