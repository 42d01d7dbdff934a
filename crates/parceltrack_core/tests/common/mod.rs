#![allow(dead_code)]

use parceltrack_core::{ClientId, Parcel};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

pub const FIXED_CREATED_AT: &str = "2026-02-13T10:00:00Z";

static NEXT_CLIENT: OnceLock<AtomicI64> = OnceLock::new();

/// Client id unique within the test process, seeded from the clock so
/// reruns against a shared file database do not collide.
pub fn unique_client() -> ClientId {
    NEXT_CLIENT
        .get_or_init(|| {
            let seconds = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs();
            AtomicI64::new(seconds as i64 * 1_000)
        })
        .fetch_add(1, Ordering::Relaxed)
}

pub fn test_parcel() -> Parcel {
    Parcel::new(1000, "test", FIXED_CREATED_AT)
}

pub fn parcel_for(client: ClientId, address: &str) -> Parcel {
    Parcel::new(client, address, FIXED_CREATED_AT)
}
