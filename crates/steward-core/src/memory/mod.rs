//! Session-scoped conversational memory.
//!
//! - [`store`]: `SessionMemory`, the bounded, TTL-limited history and entity
//!   cache for every live session.
//! - [`extractor`]: `EntityExtractor`, which recovers client entities from
//!   rendered response text.

pub mod extractor;
pub mod store;

pub use extractor::EntityExtractor;
pub use store::SessionMemory;
