//! Persistence layer for tracked shipment records.
//!
//! The record store (`repo`) is the core: six single-statement operations
//! over the `parcel` table, with status-gated writes expressed in each
//! mutation's `WHERE` clause. `db` and `service` are the caller-side
//! collaborators that open connections and drive the delivery workflow.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::parcel::{
    ClientId, Parcel, ParcelNumber, ParcelStatus, ParcelValidationError, ParseParcelStatusError,
};
pub use repo::parcel_repo::{
    ParcelRepository, Phase, RepoError, RepoResult, SqliteParcelRepository,
};
pub use service::parcel_service::ParcelService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
