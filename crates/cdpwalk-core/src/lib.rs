//! cdpwalk-core: Shared types and error kinds for the cdpwalk crawler.
//!
//! This crate provides the domain vocabulary used across the crawler:
//! - Neighbor-table records and the joined NeighborEntry rows
//! - Visit bookkeeping (PendingEntry, DeviceKey, VisitRecord, FailureRecord)
//! - The connection-attempt disposition enum and session error kinds

pub mod error;
pub mod types;

pub use error::SessionError;
