//! `parcel` table definition.

use super::DbResult;
use rusqlite::Connection;

/// Table name shared by the schema bootstrap and the record store.
pub const PARCEL_TABLE: &str = "parcel";

/// Columns the record store reads and writes.
pub const PARCEL_COLUMNS: &[&str] = &["number", "client", "address", "status", "created_at"];

const CREATE_PARCEL_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS parcel (
    number     INTEGER PRIMARY KEY AUTOINCREMENT,
    client     INTEGER NOT NULL,
    address    TEXT    NOT NULL,
    status     TEXT    NOT NULL,
    created_at TEXT    NOT NULL
);";

/// Creates the `parcel` table if it is missing.
///
/// Existing tables are left untouched, so calling this on every open is safe.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_PARCEL_TABLE_SQL)?;
    Ok(())
}
