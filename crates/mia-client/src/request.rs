//! Outbound requests, built per call and consumed by the gateway.

use std::fmt;

use mia_core::{ImageFile, MiaError, MiaResult};
use serde::Serialize;

pub use reqwest::Method;

/// One call to the service.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Attach the session's bearer token when one is present.
    pub requires_auth: bool,
}

/// Request payloads the service understands.
#[derive(Debug)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

impl OutboundRequest {
    /// Authenticated request; use [`OutboundRequest::public`] for open endpoints.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            requires_auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Mark the endpoint as public: no token is attached.
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize>(mut self, body: &T) -> MiaResult<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = Some(RequestBody::Multipart(body));
        self
    }
}

/// A `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

/// A file field of a multipart body.
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, field: impl Into<String>, file: &ImageFile) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file_name: file.name.clone(),
            mime: file.mime.clone(),
            bytes: file.bytes.clone(),
        });
        self
    }

    pub(crate) fn into_form(self) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for part in self.files {
            let file = reqwest::multipart::Part::bytes(part.bytes)
                .file_name(part.file_name)
                .mime_str(&part.mime)?;
            form = form.part(part.field, file);
        }
        Ok(form)
    }
}

/// A single path segment taken from user input, e.g. a patient id.
pub fn path_segment(field: &str, value: &str) -> MiaResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MiaError::validation(format!("{} is required", field)));
    }
    if trimmed.contains(['/', '?', '#', '%']) || trimmed.chars().any(char::is_whitespace) {
        return Err(MiaError::validation(format!(
            "{} '{}' contains characters not allowed in a path",
            field, trimmed
        )));
    }
    Ok(trimmed.to_string())
}
