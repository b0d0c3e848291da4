//! Liveness probe.

use tracing::debug;

use crate::gateway::RequestGateway;
use crate::request::OutboundRequest;

/// Whether the service answers its health endpoint.
pub async fn check(gateway: &RequestGateway) -> bool {
    let outcome = gateway.send(OutboundRequest::get("/health").public()).await;
    debug!(outcome = outcome.kind(), "Health check");
    outcome.is_success()
}
