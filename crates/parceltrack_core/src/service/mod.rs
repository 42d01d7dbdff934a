//! Caller-side use-case services.
//!
//! # Responsibility
//! - Compose record-store primitives into the parcel workflow.
//! - Keep the CLI decoupled from storage details.

pub mod parcel_service;
