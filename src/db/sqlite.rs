//! Connection setup and schema migrations for the record database.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension};

use super::DatabaseError;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by version. Every script ends by recording its own version in
/// `schema_version`.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "care records and symptom log",
    sql: include_str!("../../resources/migrations/001_initial.sql"),
}];

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) the record database at `path`.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    prepare(&conn)?;
    tracing::debug!(path = %path.display(), "Record database opened");
    Ok(conn)
}

/// In-memory database with the full schema, used by tests and fixtures.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    run_migrations(conn)
}

/// Apply every migration newer than the stored schema version. Each one runs
/// in its own transaction.
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current = schema_version(conn)?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying schema migration"
        );
        let failed = |reason: String| DatabaseError::MigrationFailed {
            version: migration.version,
            reason,
        };

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)
            .map_err(|e| failed(e.to_string()))?;
        let recorded = schema_version(&tx)?;
        if recorded != migration.version {
            return Err(failed(format!(
                "script left schema_version at {recorded}"
            )));
        }
        tx.commit()?;
    }

    Ok(())
}

/// Stored schema version; 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let has_table = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !has_table {
        return Ok(0);
    }

    let version: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

/// User table names, sorted.
pub fn table_names(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}
