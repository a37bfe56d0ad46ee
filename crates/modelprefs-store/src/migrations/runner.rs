//! Migration runner
//!
//! Applies migrations with checksums and idempotency. Bookkeeping is keyed
//! by `(migration_id, table_name)` so several preference tables can live in
//! one database.

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::get_migrations;
use crate::settings::PreferenceSettings;
use rusqlite::{Connection, OptionalExtension};

/// Apply all pending migrations for the configured preferences table
pub fn apply_migrations(conn: &mut Connection, settings: &PreferenceSettings) -> Result<()> {
    create_schema_version_table(conn)?;

    for migration in get_migrations() {
        let sql = migration.render_up(settings.table());
        apply_migration(conn, migration.id, settings.table(), &sql)?;
    }

    Ok(())
}

/// Reverse every applied migration for the configured table, newest first
pub fn rollback_migrations(conn: &mut Connection, settings: &PreferenceSettings) -> Result<()> {
    create_schema_version_table(conn)?;
    let table = settings.table();

    for migration in get_migrations().into_iter().rev() {
        let tx = conn.transaction().map_err(from_rusqlite)?;

        tx.execute_batch(&migration.render_down(table))
            .map_err(|e| migration_error(migration.id, &e.to_string()))?;
        tx.execute(
            "DELETE FROM schema_version WHERE migration_id = ?1 AND table_name = ?2",
            rusqlite::params![migration.id, table],
        )
        .map_err(from_rusqlite)?;

        tx.commit().map_err(from_rusqlite)?;
        tracing::debug!(migration_id = migration.id, table, "Rolled back migration");
    }

    Ok(())
}

/// Ids of migrations applied for `table`, in application order
pub fn applied_migrations(conn: &Connection, table: &str) -> Result<Vec<String>> {
    create_schema_version_table(conn)?;
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version WHERE table_name = ?1 ORDER BY id")
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([table], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

/// Create the schema_version table if it doesn't exist
fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL,
            table_name TEXT NOT NULL,
            applied_at INTEGER NOT NULL,
            checksum TEXT NOT NULL,
            UNIQUE (migration_id, table_name)
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Apply a single migration if not already applied
fn apply_migration(
    conn: &mut Connection,
    migration_id: &str,
    table: &str,
    sql: &str,
) -> Result<()> {
    let checksum = compute_checksum(sql);

    let recorded: Option<String> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?1 AND table_name = ?2",
            [migration_id, table],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    match recorded {
        Some(existing) if existing == checksum => return Ok(()),
        Some(existing) => return Err(checksum_mismatch(migration_id, &existing, &checksum)),
        None => {}
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(sql)
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, table_name, applied_at, checksum)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![migration_id, table, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;
    tracing::debug!(migration_id, table, "Applied migration");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        let result = apply_migrations(&mut conn, &PreferenceSettings::default());
        assert!(result.is_ok());
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        let settings = PreferenceSettings::default();
        apply_migrations(&mut conn, &settings).unwrap();
        apply_migrations(&mut conn, &settings).unwrap();
        assert_eq!(
            applied_migrations(&conn, settings.table()).unwrap(),
            vec!["001_create_model_preferences".to_string()]
        );
    }

    #[test]
    fn test_tampered_checksum_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        let settings = PreferenceSettings::default();
        apply_migrations(&mut conn, &settings).unwrap();
        conn.execute("UPDATE schema_version SET checksum = 'bogus'", [])
            .unwrap();

        let err = apply_migrations(&mut conn, &settings).unwrap_err();
        assert_eq!(err.op(), Some("migration_checksum"));
    }
}
