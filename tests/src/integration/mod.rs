//! # Integration Tests
//!
//! End-to-end flows through `OrderSyncService`, wired the same way the
//! runtime wires it.

pub mod e2e_pipeline;
pub mod flows;
