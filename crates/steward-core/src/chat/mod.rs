//! Conversational turn handling.
//!
//! `ChatService` is the single entry point used by the HTTP handlers and the
//! CLI: prompt in, reply out, with session memory updated in between.

pub mod service;

pub use service::{ChatReply, ChatService};
