//! Parcel domain model.
//!
//! # Responsibility
//! - Define the record persisted in the `parcel` table.
//! - Provide the delivery progression used by caller workflows.
//!
//! # Invariants
//! - `number` is assigned by the store; a value set before creation is only
//!   used for duplicate detection.
//! - `created_at` is an RFC 3339 timestamp and never changes after creation.
//! - `address` is never blank.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-generated parcel key.
pub type ParcelNumber = i64;

/// Identifier of the party owning a parcel.
pub type ClientId = i64;

/// Lifecycle label of a parcel.
///
/// Stored as lowercase text. `Registered` is the only state that allows
/// address correction and deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted for shipping, still editable.
    Registered,
    /// Handed over to the carrier.
    Sent,
    /// Received by the addressee.
    Delivered,
}

impl ParcelStatus {
    /// Returns the persisted text form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// Returns the next state in the delivery progression.
    ///
    /// `Delivered` is terminal and yields `None`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name a known parcel status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseParcelStatusError(pub String);

impl Display for ParseParcelStatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown parcel status `{}`; expected registered|sent|delivered",
            self.0
        )
    }
}

impl Error for ParseParcelStatusError {}

impl FromStr for ParcelStatus {
    type Err = ParseParcelStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "registered" => Ok(Self::Registered),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            other => Err(ParseParcelStatusError(other.to_string())),
        }
    }
}

/// Validation failures for parcel records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParcelValidationError {
    EmptyAddress,
    InvalidCreatedAt(String),
    NegativeNumber(ParcelNumber),
}

impl Display for ParcelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAddress => write!(f, "parcel address cannot be empty"),
            Self::InvalidCreatedAt(value) => {
                write!(f, "created_at `{value}` is not an RFC 3339 timestamp")
            }
            Self::NegativeNumber(value) => {
                write!(f, "parcel number cannot be negative, got {value}")
            }
        }
    }
}

impl Error for ParcelValidationError {}

/// Tracked shipment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Store-generated key. Zero until the parcel has been created.
    pub number: ParcelNumber,
    pub client: ClientId,
    /// Free-form destination text.
    pub address: String,
    pub status: ParcelStatus,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved `registered` parcel with an explicit timestamp.
    pub fn new(
        client: ClientId,
        address: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            number: 0,
            client,
            address: address.into(),
            status: ParcelStatus::Registered,
            created_at: created_at.into(),
        }
    }

    /// Creates an unsaved `registered` parcel stamped with the current UTC time.
    pub fn registered_now(client: ClientId, address: impl Into<String>) -> Self {
        Self::new(client, address, now_rfc3339())
    }

    /// Validates record-level invariants.
    ///
    /// # Errors
    /// - `EmptyAddress` when `address` is blank.
    /// - `InvalidCreatedAt` when `created_at` does not parse as RFC 3339.
    /// - `NegativeNumber` when `number` is below zero.
    pub fn validate(&self) -> Result<(), ParcelValidationError> {
        if self.number < 0 {
            return Err(ParcelValidationError::NegativeNumber(self.number));
        }
        validate_address(&self.address)?;
        if DateTime::parse_from_rfc3339(&self.created_at).is_err() {
            return Err(ParcelValidationError::InvalidCreatedAt(
                self.created_at.clone(),
            ));
        }
        Ok(())
    }
}

/// Rejects blank destination text.
pub fn validate_address(address: &str) -> Result<(), ParcelValidationError> {
    if address.trim().is_empty() {
        return Err(ParcelValidationError::EmptyAddress);
    }
    Ok(())
}

/// Current UTC time with second precision, e.g. `2026-10-19T08:30:00Z`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
