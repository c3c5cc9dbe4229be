//! # Order-Sync Test Suite
//!
//! Unified test crate exercising the pipeline through its public API.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs         # Pull → push → retry → dead letter → replay
//!     └── e2e_pipeline.rs  # Timer-driven runs and reconciliation views
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sync-tests
//! cargo test -p sync-tests integration::flows
//! ```

pub mod integration;
