//! # Sync Runtime Library
//!
//! Exposes the runtime's wiring and configuration for testing. The main entry
//! point is the `main.rs` binary.

#![warn(missing_docs)]

pub mod container;
#[cfg(feature = "scenarios")]
pub mod demo;

pub use container::{ConfigError, RuntimeConfig, SyncContainer};
