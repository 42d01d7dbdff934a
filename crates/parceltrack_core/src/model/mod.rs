//! Domain model for tracked shipment records.
//!
//! # Responsibility
//! - Define the canonical `Parcel` record and its lifecycle labels.
//! - Keep validation rules next to the data they guard.
//!
//! # Invariants
//! - Every stored parcel is identified by a store-generated `ParcelNumber`.
//! - Only `ParcelStatus::Registered` parcels accept address edits or deletion.

pub mod parcel;
