//! Data models for the spoofing engine.
//!
//! This module contains the persisted configuration schema:
//! - [`SpoofConfig`]: top-level wrapper matching the on-disk YAML layout
//! - [`SpoofSettings`]: the preference keys shared with the settings UI
//!
//! Every field carries a serde default so a partial or older file still
//! parses; the engine reads this schema, the settings collaborator writes it.

pub mod config;

pub use config::{SpoofConfig, SpoofSettings};
