//! Centralized user-facing messages.
//!
//! `types` declares the `Message` enum, `display` renders it, and `macros`
//! routes it to the console or to `tracing`.

pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;
