//! Typed clients for the service endpoints.
//!
//! Each function validates its input before anything is sent, goes through
//! the [`RequestGateway`](crate::RequestGateway), and surfaces failures with
//! the server's detail unchanged.

pub mod analysis;
pub mod auth;
pub mod health;
pub mod images;
pub mod patients;
pub mod reports;
