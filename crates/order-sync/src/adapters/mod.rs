//! # Adapters
//!
//! In-process implementations of the outbound ports:
//! - `memory_store`: `RecordStore` over hash maps
//! - `source`: `SourceSystem` reading the source record set
//! - `destination`: simulated `DestinationSystem` with failure injection

pub mod destination;
pub mod memory_store;
pub mod source;

pub use destination::SimulatedDestination;
pub use memory_store::InMemoryRecordStore;
pub use source::StoreBackedSource;
