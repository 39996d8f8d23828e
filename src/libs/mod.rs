//! Shared building blocks: configuration, storage paths, messages,
//! validation and presentation helpers.

pub mod choices;
pub mod config;
pub mod data_storage;
pub mod messages;
pub mod slug;
pub mod validation;
pub mod view;
