//! HTTP/REST API layer for Steward.
//!
//! Axum-based REST API with envelope response format and open CORS.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
