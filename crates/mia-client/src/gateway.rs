//! The request gateway.

use std::sync::Arc;

use mia_core::{MiaError, MiaResult};
use mia_store::SessionStore;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::events::{create_event_channel, EventReceiver, EventSender, GatewayEvent};
use crate::outcome::{classify_body, decode_data, ResponseOutcome, TIMED_OUT, UNREACHABLE};
use crate::request::{OutboundRequest, RequestBody};

/// Header carrying a per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wraps every call to the service.
///
/// Cloning is cheap; clones share the HTTP connection pool, the session store
/// and the event channel.
#[derive(Clone)]
pub struct RequestGateway {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionStore>,
    events: EventSender,
}

impl RequestGateway {
    /// Create a gateway for the configured service.
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> MiaResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MiaError::config(format!("failed to build HTTP client: {}", e)))?;

        debug!(base_url = %config.base_url, "RequestGateway initialized");
        Ok(Self {
            base_url: config.base_url.clone(),
            http,
            session,
            events: create_event_channel(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Subscribe to session events (login required, signed in, signed out).
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Broadcast an event to all subscribers.
    pub fn emit(&self, event: GatewayEvent) {
        let _ = self.events.send(event);
    }

    /// Send one request and classify the response. Never retries.
    pub async fn send(&self, request: OutboundRequest) -> ResponseOutcome {
        let OutboundRequest {
            method,
            path,
            query,
            body,
            requires_auth,
        } = request;

        let request_id = Uuid::new_v4();
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if !query.is_empty() {
            builder = builder.query(&query);
        }

        let mut authenticated = false;
        if requires_auth {
            if let Some(token) = self.session.token() {
                builder = builder.bearer_auth(token);
                authenticated = true;
            }
        }

        builder = match body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Multipart(form)) => match form.into_form() {
                Ok(form) => builder.multipart(form),
                Err(e) => {
                    warn!(%request_id, %method, path = %path, error = %e, "Invalid multipart body");
                    return ResponseOutcome::failure(format!("invalid multipart body: {}", e));
                }
            },
        };

        debug!(%request_id, %method, path = %path, authenticated, "Sending request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let detail = if e.is_timeout() { TIMED_OUT } else { UNREACHABLE };
                warn!(%request_id, %method, path = %path, error = %e, "Request failed");
                return ResponseOutcome::failure(detail);
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.evict(&path);
            return ResponseOutcome::AuthRejected;
        }

        let outcome = match response.text().await {
            Ok(body) => classify_body(status, &body),
            Err(e) => {
                let detail = if e.is_timeout() { TIMED_OUT } else { UNREACHABLE };
                warn!(%request_id, path = %path, error = %e, "Failed to read response body");
                ResponseOutcome::failure(detail)
            }
        };

        match &outcome {
            ResponseOutcome::NetworkOrServerFailure(detail) => {
                warn!(%request_id, %method, path = %path, status = status.as_u16(), detail = %detail, "Request classified as failure");
            }
            _ => {
                debug!(%request_id, %method, path = %path, status = status.as_u16(), outcome = outcome.kind(), "Request completed");
            }
        }
        outcome
    }

    /// Send a request and decode the envelope's `data` into `T`. A payload
    /// that does not match `T` is a failure, not a panic.
    pub async fn send_json<T: DeserializeOwned>(&self, request: OutboundRequest) -> ResponseOutcome<T> {
        self.send(request).await.and_then(decode_data)
    }

    /// A 401 was observed: drop the session and ask the host to show login.
    fn evict(&self, path: &str) {
        info!(path, "Authorization rejected, clearing session");
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear stored session after 401");
        }
        self.emit(GatewayEvent::LoginRequired {
            path: path.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MultipartBody;
    use mia_core::{ImageFile, Session, UserProfile, UserRole};
    use std::time::Duration;
    use tokio::sync::broadcast::error::TryRecvError;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile() -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            email: "a@b.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: UserRole::Student,
            institution: None,
        }
    }

    fn gateway_for(server: &MockServer) -> RequestGateway {
        let config = ClientConfig::new(&server.uri()).unwrap();
        RequestGateway::new(&config, Arc::new(SessionStore::in_memory())).unwrap()
    }

    fn signed_in(gateway: &RequestGateway) {
        gateway.session().set(Session::new("tok-123", profile())).unwrap();
    }

    async fn authorization_headers(server: &MockServer) -> Vec<Option<String>> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|req| {
                req.headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_token_attached_when_session_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/patients/"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "message": "ok", "data": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        signed_in(&gateway);

        let outcome = gateway.send(OutboundRequest::get("/patients/")).await;
        assert!(outcome.is_success(), "got {outcome:?}");
    }

    #[tokio::test]
    async fn test_no_token_when_session_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/patients/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "message": "ok", "data": []
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let outcome = gateway.send(OutboundRequest::get("/patients/")).await;

        assert!(outcome.is_success());
        assert_eq!(authorization_headers(&server).await, vec![None]);
    }

    #[tokio::test]
    async fn test_public_request_never_carries_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "healthy"})))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        signed_in(&gateway);
        let outcome = gateway.send(OutboundRequest::get("/health").public()).await;

        assert!(outcome.is_success());
        assert_eq!(authorization_headers(&server).await, vec![None]);
    }

    #[tokio::test]
    async fn test_401_evicts_session_and_signals_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports/patient/P-1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "detail": "Could not validate credentials"
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        signed_in(&gateway);
        let mut events = gateway.subscribe();

        let outcome = gateway.send(OutboundRequest::get("/reports/patient/P-1")).await;

        assert_eq!(outcome, ResponseOutcome::AuthRejected);
        assert!(gateway.session().get().is_none());
        assert_eq!(
            events.try_recv().unwrap(),
            GatewayEvent::LoginRequired {
                path: "/reports/patient/P-1".to_string()
            }
        );
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_each_401_signals_again() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let mut events = gateway.subscribe();

        gateway.send(OutboundRequest::post("/analyze")).await;
        gateway.send(OutboundRequest::post("/analyze")).await;

        let mut received = 0;
        while events.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 2);
    }

    #[tokio::test]
    async fn test_server_error_is_failure_and_keeps_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/patients/"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "detail": "database offline"
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        signed_in(&gateway);
        let mut events = gateway.subscribe();

        let outcome = gateway.send(OutboundRequest::get("/patients/")).await;

        assert_eq!(outcome, ResponseOutcome::failure("database offline"));
        assert!(gateway.session().get().is_some());
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let config = ClientConfig::new(&uri).unwrap();
        let gateway = RequestGateway::new(&config, Arc::new(SessionStore::in_memory())).unwrap();
        let outcome = gateway.send(OutboundRequest::get("/health").public()).await;

        assert_eq!(outcome, ResponseOutcome::failure(UNREACHABLE));
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = ClientConfig::new(&server.uri())
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        let gateway = RequestGateway::new(&config, Arc::new(SessionStore::in_memory())).unwrap();
        let outcome = gateway.send(OutboundRequest::get("/health").public()).await;

        assert_eq!(outcome, ResponseOutcome::failure(TIMED_OUT));
    }

    #[tokio::test]
    async fn test_query_and_request_id_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/patients/"))
            .and(query_param("skip", "10"))
            .and(query_param("limit", "5"))
            .respond_with(|req: &wiremock::Request| {
                assert!(req.headers.get(REQUEST_ID_HEADER).is_some());
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true, "data": []}))
            })
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let outcome = gateway
            .send(OutboundRequest::get("/patients/").query("skip", 10).query("limit", 5))
            .await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_multipart_body_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(|req: &wiremock::Request| {
                let content_type = req
                    .headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                assert!(content_type.starts_with("multipart/form-data"));
                let body = String::from_utf8_lossy(&req.body);
                assert!(body.contains("name=\"study_type\""));
                assert!(body.contains("chest_xray"));
                assert!(body.contains("filename=\"scan.png\""));
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true, "data": {}}))
            })
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let body = MultipartBody::new()
            .file("file", &ImageFile::new("scan.png", vec![0x89, 0x50, 0x4e, 0x47]))
            .text("study_type", "chest_xray");
        let outcome = gateway.send(OutboundRequest::post("/analyze").multipart(body)).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_send_json_decodes_data() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Created {
            patient_id: String,
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/patients/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "message": "Patient created successfully", "data": {"patient_id": "abc"}
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let outcome: ResponseOutcome<Created> = gateway.send_json(OutboundRequest::post("/patients/")).await;
        assert_eq!(
            outcome,
            ResponseOutcome::Success(Created {
                patient_id: "abc".to_string()
            })
        );
    }
}
