//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete primitives over the `parcel` table.
//! - Report storage failures with the operation and phase that failed.
//!
//! # Invariants
//! - Every operation runs exactly one data statement.
//! - `address` changes and deletion only apply while `status = 'registered'`;
//!   the condition lives in the statement's `WHERE` clause.
//! - Create refuses a caller-supplied `number` that already has a live row,
//!   checked inside the insert statement itself.
//! - Zero affected rows on update/delete is not an error.
//! - Reads return rows as stored; only `status` must decode.

use crate::db::schema::{PARCEL_COLUMNS, PARCEL_TABLE};
use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus, ParcelValidationError};
use log::{debug, error};
use rusqlite::{params, Connection, Row, ToSql};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const INSERT_IF_ABSENT_SQL: &str = "INSERT INTO parcel (client, address, status, created_at)
     SELECT ?1, ?2, ?3, ?4
     WHERE NOT EXISTS (SELECT 1 FROM parcel WHERE number = ?5);";

const SELECT_BY_NUMBER_SQL: &str = "SELECT number, client, address, status, created_at
     FROM parcel
     WHERE number = ?1;";

const SELECT_BY_CLIENT_SQL: &str = "SELECT number, client, address, status, created_at
     FROM parcel
     WHERE client = ?1;";

const UPDATE_STATUS_SQL: &str = "UPDATE parcel SET status = ?1 WHERE number = ?2;";

const UPDATE_ADDRESS_SQL: &str =
    "UPDATE parcel SET address = ?1 WHERE number = ?2 AND status = ?3;";

const DELETE_SQL: &str = "DELETE FROM parcel WHERE number = ?1 AND status = ?2;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Stage of a statement's lifecycle in which a storage failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Prepare,
    Execute,
    Scan,
    Iterate,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Execute => "execute",
            Self::Scan => "scan",
            Self::Iterate => "iterate",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by parcel repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// A live row already uses the caller-supplied number.
    DuplicateKey(ParcelNumber),
    /// Point lookup matched no row.
    NotFound(ParcelNumber),
    /// The backing connection failed; `source` keeps the original error.
    Persistence {
        op: &'static str,
        phase: Phase,
        source: DbError,
    },
    Validation(ParcelValidationError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateKey(_) => "duplicate_key",
            Self::NotFound(_) => "not_found",
            Self::Persistence { .. } => "persistence",
            Self::Validation(_) => "validation",
            Self::InvalidData(_) => "invalid_data",
            Self::MissingRequiredTable(_) | Self::MissingRequiredColumn { .. } => {
                "schema_not_ready"
            }
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKey(number) => write!(f, "parcel {number} already exists"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::Persistence { op, phase, source } => {
                write!(f, "parcel {op} failed during {phase}: {source}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` does not exist")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` does not exist")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => Some(source),
            Self::Validation(err) => Some(err),
            Self::DuplicateKey(_)
            | Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ParcelValidationError> for RepoError {
    fn from(value: ParcelValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Repository interface for parcel records.
pub trait ParcelRepository {
    /// Inserts a parcel and returns the store-generated number.
    fn create_parcel(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel; `NotFound` when absent.
    fn get_parcel(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Loads every parcel owned by `client`, in storage order.
    fn get_parcels_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Overwrites the status; succeeds when nothing matches.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()>;
    /// Overwrites the address of a registered parcel; succeeds when nothing matches.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    /// Removes a registered parcel; succeeds when nothing matches.
    fn delete_parcel(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel repository over a borrowed connection.
pub struct SqliteParcelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelRepository<'conn> {
    /// Constructs a repository after checking the `parcel` table shape.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when `parcel` does not exist.
    /// - `MissingRequiredColumn` when a column the store uses is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_table_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelRepository<'_> {
    fn create_parcel(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        let started_at = Instant::now();
        let result = self.insert_if_absent(parcel);
        if let Ok(number) = &result {
            debug!("event=parcel_create module=repo status=ok number={number}");
        }
        finish("create", started_at, result)
    }

    fn get_parcel(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let started_at = Instant::now();
        finish("get", started_at, self.select_one(number))
    }

    fn get_parcels_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let started_at = Instant::now();
        let result = self.select_by_client(client);
        if let Ok(parcels) = &result {
            debug!(
                "event=parcel_get_by_client module=repo status=ok count={}",
                parcels.len()
            );
        }
        finish("get_by_client", started_at, result)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        self.execute_mutation(
            "set_status",
            UPDATE_STATUS_SQL,
            params![status.as_str(), number],
        )
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        self.execute_mutation(
            "set_address",
            UPDATE_ADDRESS_SQL,
            params![address, number, ParcelStatus::Registered.as_str()],
        )
    }

    fn delete_parcel(&self, number: ParcelNumber) -> RepoResult<()> {
        self.execute_mutation(
            "delete",
            DELETE_SQL,
            params![number, ParcelStatus::Registered.as_str()],
        )
    }
}

impl SqliteParcelRepository<'_> {
    fn insert_if_absent(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        const OP: &str = "create";
        parcel.validate()?;

        let mut stmt = self
            .conn
            .prepare(INSERT_IF_ABSENT_SQL)
            .map_err(persistence(OP, Phase::Prepare))?;
        let inserted = stmt
            .execute(params![
                parcel.client,
                parcel.address.as_str(),
                parcel.status.as_str(),
                parcel.created_at.as_str(),
                parcel.number,
            ])
            .map_err(persistence(OP, Phase::Execute))?;

        if inserted == 0 {
            return Err(RepoError::DuplicateKey(parcel.number));
        }

        Ok(self.conn.last_insert_rowid())
    }

    fn select_one(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        const OP: &str = "get";
        let mut stmt = self
            .conn
            .prepare(SELECT_BY_NUMBER_SQL)
            .map_err(persistence(OP, Phase::Prepare))?;
        let mut rows = stmt
            .query(params![number])
            .map_err(persistence(OP, Phase::Execute))?;

        if let Some(row) = rows.next().map_err(persistence(OP, Phase::Iterate))? {
            return parse_parcel_row(OP, row);
        }

        Err(RepoError::NotFound(number))
    }

    fn select_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        const OP: &str = "get_by_client";
        let mut stmt = self
            .conn
            .prepare(SELECT_BY_CLIENT_SQL)
            .map_err(persistence(OP, Phase::Prepare))?;
        let mut rows = stmt
            .query(params![client])
            .map_err(persistence(OP, Phase::Execute))?;

        let mut parcels = Vec::new();
        while let Some(row) = rows.next().map_err(persistence(OP, Phase::Iterate))? {
            parcels.push(parse_parcel_row(OP, row)?);
        }

        Ok(parcels)
    }

    /// Runs one update/delete statement. The affected-row count is logged
    /// and otherwise discarded.
    fn execute_mutation(
        &self,
        op: &'static str,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.execute_counted(op, sql, params).map(|changed| {
            debug!("event=parcel_{op} module=repo status=ok matched={changed}");
        });
        finish(op, started_at, result)
    }

    fn execute_counted(
        &self,
        op: &'static str,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> RepoResult<usize> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(persistence(op, Phase::Prepare))?;
        stmt.execute(params).map_err(persistence(op, Phase::Execute))
    }
}

fn persistence(op: &'static str, phase: Phase) -> impl FnOnce(rusqlite::Error) -> RepoError {
    move |err| RepoError::Persistence {
        op,
        phase,
        source: DbError::Sqlite(err),
    }
}

fn finish<T>(op: &'static str, started_at: Instant, result: RepoResult<T>) -> RepoResult<T> {
    if let Err(err) = &result {
        match err {
            RepoError::NotFound(_) | RepoError::DuplicateKey(_) | RepoError::Validation(_) => {
                debug!(
                    "event=parcel_{op} module=repo status=rejected duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    err.code()
                );
            }
            _ => {
                error!(
                    "event=parcel_{op} module=repo status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
            }
        }
    }
    result
}

fn parse_parcel_row(op: &'static str, row: &Row<'_>) -> RepoResult<Parcel> {
    let number: ParcelNumber = row.get("number").map_err(persistence(op, Phase::Scan))?;

    let status_text: String = row.get("status").map_err(persistence(op, Phase::Scan))?;
    let status = status_text.parse::<ParcelStatus>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in parcel.status for number {number}"
        ))
    })?;

    Ok(Parcel {
        number,
        client: row.get("client").map_err(persistence(op, Phase::Scan))?,
        address: row.get("address").map_err(persistence(op, Phase::Scan))?,
        status,
        created_at: row
            .get("created_at")
            .map_err(persistence(op, Phase::Scan))?,
    })
}

fn ensure_parcel_table_ready(conn: &Connection) -> RepoResult<()> {
    const OP: &str = "schema_check";
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1);")
        .map_err(persistence(OP, Phase::Prepare))?;
    let columns = stmt
        .query_map([PARCEL_TABLE], |row| row.get::<_, String>(0))
        .map_err(persistence(OP, Phase::Execute))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(persistence(OP, Phase::Scan))?;

    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    for &column in PARCEL_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}
