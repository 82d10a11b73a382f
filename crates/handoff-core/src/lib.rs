//! Core abstractions for server-to-client data handoff.
//!
//! This crate provides the fundamental types shared by the handoff crates:
//! - `RenderMode` - Which side of the handoff the current pass runs on
//! - `HandoffConfig` - Namespace and exclusion configuration
//! - `ConfigError` - Configuration loading failures

mod config;
mod context;

pub use config::*;
pub use context::*;
