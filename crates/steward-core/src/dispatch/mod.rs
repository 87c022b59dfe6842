//! Dispatch of resolved intents to the backend, and rendering of results.

pub mod dispatcher;
pub mod render;

pub use dispatcher::{DispatchOutcome, Dispatcher};
