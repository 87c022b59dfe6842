//! Prompt -> intent resolution.
//!
//! - [`pattern`]: the ordered pattern library and parameter extraction.
//! - [`resolver`]: the three-phase resolver that consults session context
//!   before the pattern library.

pub mod pattern;
pub mod resolver;

pub use resolver::{ConfirmationReply, IntentResolver, Resolution, ResolutionPhase};
