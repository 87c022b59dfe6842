//! Shared domain types for Steward.
//!
//! This crate contains the core domain types used across the command router:
//! intents, parameter sets, conversation interactions, tracked entities,
//! backend records, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod intent;
pub mod params;
pub mod record;
pub mod session;
