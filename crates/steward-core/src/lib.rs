//! Intent resolution, session memory, and dispatch for Steward.
//!
//! This crate defines the "port" (the `BackendClient` trait) that the
//! infrastructure layer implements. It depends only on `steward-types` --
//! never on `steward-infra` or any HTTP crate.

pub mod backend;
pub mod chat;
pub mod dispatch;
pub mod intent;
pub mod memory;
