//! Gemini API client.
//!
//! Split into config (builder), client (request building and response
//! parsing), and api (the `GenerativeClient` impl: single-shot and
//! streaming calls).

mod api;
mod client;
mod config;

pub use client::GeminiClient;
pub use config::GeminiConfig;
