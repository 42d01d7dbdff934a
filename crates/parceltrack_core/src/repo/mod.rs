//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for parcel records.
//! - Isolate SQLite query details from caller workflows.
//!
//! # Invariants
//! - Status-gated writes are enforced inside the mutating SQL predicate,
//!   never by a separate read before the write.
//! - Point lookups return `NotFound`; mutations that match nothing succeed.

pub mod parcel_repo;
