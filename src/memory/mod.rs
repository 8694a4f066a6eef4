//! Conversation memory
//!
//! Per-(user, session) ordered history with bounded retention. The only
//! state that outlives a single request lives here.

pub mod store;

pub use store::{MemoryStore, RetentionPolicy};
