//! Infrastructure layer for Steward.
//!
//! Contains the implementations of the ports defined in `steward-core`:
//! the reqwest-backed `HttpBackendClient` for the CRUD service, plus the
//! TOML configuration loader.

pub mod backend;
pub mod config;
