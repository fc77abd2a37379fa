// Public modules
pub mod chat;
pub mod client;
pub mod contact;
pub mod error;
pub mod observability;
pub mod provider;
pub mod render;
pub mod reveal;
pub mod types;

#[cfg(test)]
mod test_server;

// Re-exports
pub use client::{API_KEY_ENV_VARS, Gemini};
pub use contact::{ContactRelay, ContactRequest, ServiceInterest};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use provider::{ChatHandle, ChatProvider, GeminiChat, GeminiProvider, Reply};
pub use reveal::RevealOnce;
pub use types::*;
