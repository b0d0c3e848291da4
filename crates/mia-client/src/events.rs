//! Session events broadcast by the gateway.
//!
//! The host UI subscribes to these instead of the gateway navigating on its
//! own; `LoginRequired` is the "redirect to login" signal.

use tokio::sync::broadcast;

/// Events emitted by the gateway and the auth client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayEvent {
    /// A request was rejected with 401; the session has been cleared.
    LoginRequired { path: String },
    /// A login succeeded and the session store was populated.
    SignedIn { email: String },
    /// The user logged out.
    SignedOut,
}

/// Type alias for the broadcast sender.
pub type EventSender = broadcast::Sender<GatewayEvent>;

/// Type alias for the broadcast receiver.
pub type EventReceiver = broadcast::Receiver<GatewayEvent>;

/// Create a new event channel with default capacity.
pub fn create_event_channel() -> EventSender {
    let (tx, _rx) = broadcast::channel(32);
    tx
}
