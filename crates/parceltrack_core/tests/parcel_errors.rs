mod common;

use common::{test_parcel, FIXED_CREATED_AT};
use parceltrack_core::db::{ensure_schema, open_db_in_memory};
use parceltrack_core::{
    Parcel, ParcelRepository, ParcelStatus, ParcelValidationError, Phase, RepoError,
    SqliteParcelRepository,
};
use rusqlite::Connection;
use std::error::Error;

#[test]
fn missing_table_surfaces_prepare_failure_with_source() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();
    conn.execute_batch("DROP TABLE parcel;").unwrap();

    let err = repo.get_parcel(1).unwrap_err();
    match &err {
        RepoError::Persistence { op, phase, .. } => {
            assert_eq!(*op, "get");
            assert_eq!(*phase, Phase::Prepare);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.source().is_some());
    assert!(err.to_string().contains("during prepare"));

    let err = repo.get_parcels_by_client(1).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Persistence {
            op: "get_by_client",
            phase: Phase::Prepare,
            ..
        }
    ));

    for result in [
        repo.set_status(1, ParcelStatus::Sent),
        repo.set_address(1, "somewhere"),
        repo.delete_parcel(1),
    ] {
        assert!(matches!(
            result,
            Err(RepoError::Persistence {
                phase: Phase::Prepare,
                ..
            })
        ));
    }

    let err = repo.create_parcel(&test_parcel()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Persistence {
            op: "create",
            phase: Phase::Prepare,
            ..
        }
    ));
}

#[test]
fn undecodable_column_surfaces_scan_failure() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO parcel (client, address, status, created_at)
         VALUES ('not-a-number', 'x', 'registered', ?1);",
        [FIXED_CREATED_AT],
    )
    .unwrap();
    let number = conn.last_insert_rowid();

    let err = repo.get_parcel(number).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Persistence {
            op: "get",
            phase: Phase::Scan,
            ..
        }
    ));
}

#[test]
fn unknown_persisted_status_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO parcel (client, address, status, created_at)
         VALUES (7, 'x', 'lost', ?1);",
        [FIXED_CREATED_AT],
    )
    .unwrap();
    let number = conn.last_insert_rowid();

    assert!(matches!(
        repo.get_parcel(number),
        Err(RepoError::InvalidData(_))
    ));
    assert!(matches!(
        repo.get_parcels_by_client(7),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn create_rejects_invalid_parcels_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let blank = Parcel::new(1, "   ", FIXED_CREATED_AT);
    assert!(matches!(
        repo.create_parcel(&blank),
        Err(RepoError::Validation(ParcelValidationError::EmptyAddress))
    ));

    let bad_time = Parcel::new(1, "somewhere", "yesterday");
    assert!(matches!(
        repo.create_parcel(&bad_time),
        Err(RepoError::Validation(ParcelValidationError::InvalidCreatedAt(_)))
    ));

    assert!(repo.get_parcels_by_client(1).unwrap().is_empty());
}

#[test]
fn store_applies_any_address_including_blank() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    repo.set_address(9_999, "").unwrap();

    let number = repo.create_parcel(&test_parcel()).unwrap();
    repo.set_address(number, "").unwrap();
    assert_eq!(repo.get_parcel(number).unwrap().address, "");
}

#[test]
fn rows_written_by_other_writers_are_returned_as_stored() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let own = repo.create_parcel(&Parcel::new(5, "own", FIXED_CREATED_AT)).unwrap();
    conn.execute(
        "INSERT INTO parcel (client, address, status, created_at)
         VALUES (5, '', 'registered', '2026-10-19 15:08:53');",
        [],
    )
    .unwrap();
    let foreign = conn.last_insert_rowid();

    let loaded = repo.get_parcel(foreign).unwrap();
    assert_eq!(loaded.created_at, "2026-10-19 15:08:53");
    assert_eq!(loaded.address, "");

    let mut numbers: Vec<_> = repo
        .get_parcels_by_client(5)
        .unwrap()
        .into_iter()
        .map(|parcel| parcel.number)
        .collect();
    numbers.sort();
    assert_eq!(numbers, vec![own, foreign]);
}

#[test]
fn failing_statement_step_surfaces_execute_phase() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();
    let number = repo.create_parcel(&test_parcel()).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER parcel_no_insert BEFORE INSERT ON parcel
         BEGIN SELECT RAISE(ABORT, 'inserts disabled'); END;
         CREATE TRIGGER parcel_no_update BEFORE UPDATE ON parcel
         BEGIN SELECT RAISE(ABORT, 'updates disabled'); END;
         CREATE TRIGGER parcel_no_delete BEFORE DELETE ON parcel
         BEGIN SELECT RAISE(ABORT, 'deletes disabled'); END;",
    )
    .unwrap();

    let err = repo.create_parcel(&test_parcel()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Persistence {
            op: "create",
            phase: Phase::Execute,
            ..
        }
    ));

    let err = repo.set_status(number, ParcelStatus::Sent).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Persistence {
            op: "set_status",
            phase: Phase::Execute,
            ..
        }
    ));
    assert!(err.to_string().contains("during execute"));
    assert!(err.to_string().contains("updates disabled"));

    assert!(matches!(
        repo.set_address(number, "elsewhere"),
        Err(RepoError::Persistence {
            op: "set_address",
            phase: Phase::Execute,
            ..
        })
    ));
    assert!(matches!(
        repo.delete_parcel(number),
        Err(RepoError::Persistence {
            op: "delete",
            phase: Phase::Execute,
            ..
        })
    ));

    let unchanged = repo.get_parcel(number).unwrap();
    assert_eq!(unchanged.status, ParcelStatus::Registered);
    assert_eq!(unchanged.address, "test");
}

#[test]
fn failure_while_reading_rows_surfaces_iterate_phase() {
    let conn = Connection::open_in_memory().unwrap();
    // abs(i64::MIN) overflows while the query is stepped, after prepare and bind.
    conn.execute_batch(
        "CREATE TABLE parcel_rows (
            number INTEGER PRIMARY KEY AUTOINCREMENT,
            client INTEGER NOT NULL,
            address TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE VIEW parcel AS
            SELECT number, abs(client) AS client, address, status, created_at
            FROM parcel_rows;",
    )
    .unwrap();
    conn.execute(
        "INSERT INTO parcel_rows (client, address, status, created_at)
         VALUES (?1, 'x', 'registered', ?2);",
        rusqlite::params![i64::MIN, FIXED_CREATED_AT],
    )
    .unwrap();

    let repo = SqliteParcelRepository::try_new(&conn).unwrap();
    let err = repo.get_parcels_by_client(1).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Persistence {
            op: "get_by_client",
            phase: Phase::Iterate,
            ..
        }
    ));
    assert!(err.source().is_some());
}

#[test]
fn repository_rejects_connection_without_parcel_table() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteParcelRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("parcel"))));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE parcel (
            number INTEGER PRIMARY KEY AUTOINCREMENT,
            client INTEGER NOT NULL,
            address TEXT NOT NULL,
            status TEXT NOT NULL
        );",
    )
    .unwrap();

    let result = SqliteParcelRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "parcel",
            column: "created_at"
        })
    ));
}

#[test]
fn repository_accepts_caller_created_schema() {
    let conn = Connection::open_in_memory().unwrap();
    ensure_schema(&conn).unwrap();

    let repo = SqliteParcelRepository::try_new(&conn).unwrap();
    let number = repo.create_parcel(&test_parcel()).unwrap();
    assert!(number > 0);
}
