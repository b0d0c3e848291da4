//! # MIA Client
//!
//! The request gateway every call to the Medical Imaging Assistant service
//! goes through, plus typed clients for its endpoints.
//!
//! The gateway injects the session's bearer token, classifies each response
//! into a [`ResponseOutcome`], and on a 401 evicts the session and broadcasts
//! [`GatewayEvent::LoginRequired`].

pub mod api;
pub mod config;
pub mod events;
pub mod gateway;
pub mod outcome;
pub mod request;

pub use config::{ClientConfig, ConfigOverrides};
pub use events::{EventReceiver, EventSender, GatewayEvent};
pub use gateway::RequestGateway;
pub use outcome::ResponseOutcome;
pub use request::{FilePart, Method, MultipartBody, OutboundRequest, RequestBody};
