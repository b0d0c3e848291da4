//! Response classification.
//!
//! Every call resolves to exactly one [`ResponseOutcome`]; callers match on
//! it exhaustively instead of catching errors.

use mia_core::{MiaError, MiaResult};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) const UNREACHABLE: &str = "service unreachable";
pub(crate) const TIMED_OUT: &str = "request timed out";
pub(crate) const MALFORMED: &str = "malformed response payload";

/// Classified result of one call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome<T = Value> {
    Success(T),
    /// The service answered 401. The session has already been evicted.
    AuthRejected,
    /// Transport error, non-2xx status, unusable body or an envelope that
    /// reports failure. Carries a human readable detail.
    NetworkOrServerFailure(String),
}

impl<T> ResponseOutcome<T> {
    pub fn failure(detail: impl Into<String>) -> Self {
        Self::NetworkOrServerFailure(detail.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseOutcome<U> {
        self.and_then(|value| ResponseOutcome::Success(f(value)))
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> ResponseOutcome<U>) -> ResponseOutcome<U> {
        match self {
            Self::Success(value) => f(value),
            Self::AuthRejected => ResponseOutcome::AuthRejected,
            Self::NetworkOrServerFailure(detail) => ResponseOutcome::NetworkOrServerFailure(detail),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::AuthRejected => "auth_rejected",
            Self::NetworkOrServerFailure(_) => "failure",
        }
    }

    /// Surface the outcome as a `Result`, keeping the failure detail as-is.
    pub fn into_result(self) -> MiaResult<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::AuthRejected => Err(MiaError::AuthRejected),
            Self::NetworkOrServerFailure(detail) => Err(MiaError::Service(detail)),
        }
    }
}

/// Classify a response that was not a 401.
pub(crate) fn classify_body(status: StatusCode, body: &str) -> ResponseOutcome {
    if !status.is_success() {
        let detail = server_detail(body)
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
        return ResponseOutcome::NetworkOrServerFailure(detail);
    }

    if body.trim().is_empty() {
        return ResponseOutcome::Success(Value::Null);
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return ResponseOutcome::failure(MALFORMED),
    };

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let detail = envelope_message(&value).unwrap_or_else(|| "request failed".to_string());
        return ResponseOutcome::NetworkOrServerFailure(detail);
    }

    ResponseOutcome::Success(value)
}

/// Decode the useful part of a success body: the envelope's `data` when the
/// body is a `{ success, message, data }` envelope, otherwise the whole body.
pub(crate) fn decode_data<T: DeserializeOwned>(body: Value) -> ResponseOutcome<T> {
    let data = match body {
        Value::Object(mut map) if map.contains_key("success") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    match serde_json::from_value(data) {
        Ok(value) => ResponseOutcome::Success(value),
        Err(e) => ResponseOutcome::failure(format!("{}: {}", MALFORMED, e)),
    }
}

/// Message the server put in an error body, if any.
///
/// Understands FastAPI's `{"detail": "..."}` and `{"detail": [{"msg": ...}]}`
/// shapes as well as the service's own envelope.
fn server_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => Some(detail.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => envelope_message(&value),
    }
}

fn envelope_message(value: &Value) -> Option<String> {
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty());
    let errors: Vec<&str> = value
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| errors.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    match (message, errors.is_empty()) {
        (Some(message), true) => Some(message.to_string()),
        (Some(message), false) => Some(format!("{}: {}", message, errors.join("; "))),
        (None, false) => Some(errors.join("; ")),
        (None, true) => None,
    }
}
