//! # Domain Layer - Order Sync
//!
//! Pure business logic: entities, the per-order state machine and the
//! read models. No I/O.
//!
//! ## Components
//!
//! - `entities`: SourceOrder, DestinationOrder, SyncRecord and its state machine
//! - `value_objects`: Job, OrderSubmission, reconciliation and listing views
//! - `errors`: SyncError enumeration
//! - `invariants`: store-wide consistency checks

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
