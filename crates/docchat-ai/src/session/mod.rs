//! Conversational session management.
//!
//! A [`ChatSession`] holds the message history for one document set and
//! enforces the attach-once rule for document payloads. The
//! [`SessionManager`] is the get-or-create accessor that guarantees at
//! most one live session per document set.

mod chat;
mod manager;
mod types;

pub use manager::{ChatSession, SessionManager, SYSTEM_INSTRUCTION};
