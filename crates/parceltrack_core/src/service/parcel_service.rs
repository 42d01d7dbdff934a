//! Parcel use-case service.
//!
//! # Responsibility
//! - Register parcels, walk them through the delivery progression and
//!   expose the store's primitives to callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - The service never relaxes store semantics: gated mutations that match
//!   nothing still succeed silently.
//! - Service layer remains storage-agnostic.

use crate::model::parcel::{validate_address, ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoResult};
use log::info;

/// Use-case service wrapper for parcel operations.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel stamped with the current time.
    ///
    /// # Contract
    /// - Status starts as `registered`.
    /// - Returns the stored record with its generated number.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        let mut parcel = Parcel::registered_now(client, address);
        parcel.number = self.repo.create_parcel(&parcel)?;
        info!(
            "event=parcel_register module=service status=ok number={} client={}",
            parcel.number, parcel.client
        );
        Ok(parcel)
    }

    /// Creates a caller-built parcel and returns its generated number.
    pub fn create(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.repo.create_parcel(parcel)
    }

    pub fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get_parcel(number)
    }

    /// Lists a client's parcels ordered by number.
    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut parcels = self.repo.get_parcels_by_client(client)?;
        parcels.sort_by_key(|parcel| parcel.number);
        Ok(parcels)
    }

    /// Moves a parcel one step along `registered -> sent -> delivered`.
    ///
    /// Returns the new status, or `None` without writing when the parcel is
    /// already delivered. Fails with `NotFound` for unknown numbers.
    pub fn next_status(&self, number: ParcelNumber) -> RepoResult<Option<ParcelStatus>> {
        let parcel = self.repo.get_parcel(number)?;
        let Some(next) = parcel.status.next() else {
            info!("event=parcel_next_status module=service status=skipped number={number} reason=delivered");
            return Ok(None);
        };

        self.repo.set_status(number, next)?;
        info!(
            "event=parcel_next_status module=service status=ok number={number} from={} to={next}",
            parcel.status
        );
        Ok(Some(next))
    }

    /// Overwrites the status unconditionally.
    pub fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        self.repo.set_status(number, status)
    }

    /// Corrects the address; no-op unless the parcel is still registered.
    ///
    /// Blank addresses are rejected with `Validation` before the store is
    /// touched.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        validate_address(address)?;
        self.repo.set_address(number, address)
    }

    /// Deletes the parcel; no-op unless the parcel is still registered.
    pub fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        self.repo.delete_parcel(number)
    }
}
