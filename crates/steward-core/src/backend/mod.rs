//! Backend CRUD service port.
//!
//! Defines the `BackendClient` trait that the infrastructure layer implements
//! over HTTP. The core never depends on any transport crate.

pub mod client;
