//! Registration, login and logout.

use mia_core::session::{validate_credentials, validate_new_user};
use mia_core::{Credentials, MiaError, MiaResult, NewUser, Session, UserProfile};
use serde::Deserialize;
use tracing::info;

use crate::events::GatewayEvent;
use crate::gateway::RequestGateway;
use crate::outcome::ResponseOutcome;
use crate::request::OutboundRequest;

/// `data` of a successful login.
#[derive(Debug, Deserialize)]
struct LoginPayload {
    access_token: String,
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    user_id: String,
}

/// Create an account. Returns the new user's id.
pub async fn register(gateway: &RequestGateway, user: &NewUser) -> MiaResult<String> {
    let user = validate_new_user(user)?;
    let request = OutboundRequest::post("/auth/register").public().json(&user)?;

    let payload: RegisterPayload = gateway.send_json(request).await.into_result()?;
    info!(email = %user.email, user_id = %payload.user_id, "Registered user");
    Ok(payload.user_id)
}

/// Log in and populate the session store.
pub async fn login(gateway: &RequestGateway, credentials: &Credentials) -> MiaResult<Session> {
    let credentials = validate_credentials(credentials)?;
    let request = OutboundRequest::post("/auth/login").public().json(&credentials)?;

    let payload: LoginPayload = match gateway.send_json(request).await {
        ResponseOutcome::Success(payload) => payload,
        ResponseOutcome::AuthRejected => {
            return Err(MiaError::service("Invalid email or password"));
        }
        ResponseOutcome::NetworkOrServerFailure(detail) => return Err(MiaError::Service(detail)),
    };

    if payload.access_token.trim().is_empty() {
        return Err(MiaError::service("Login failed: no access token returned"));
    }

    let session = Session::new(payload.access_token, payload.user);
    gateway.session().set(session.clone())?;

    info!(user = %session.user.email, role = %session.user.role, "Logged in");
    gateway.emit(GatewayEvent::SignedIn {
        email: session.user.email.clone(),
    });
    Ok(session)
}

/// Forget the current session. Purely client side.
pub fn logout(gateway: &RequestGateway) -> MiaResult<()> {
    let was_present = gateway.session().is_present();
    gateway.session().clear()?;
    if was_present {
        info!("Logged out");
        gateway.emit(GatewayEvent::SignedOut);
    }
    Ok(())
}
