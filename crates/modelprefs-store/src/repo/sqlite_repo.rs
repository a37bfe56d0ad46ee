//! SQLite preference backend
//!
//! Persists preference rows in the configured table

use crate::errors::{from_rusqlite, Result};
use crate::settings::PreferenceSettings;
use chrono::{DateTime, Utc};
use modelprefs_core::{NameFilter, OwnerRef, PreferenceBackend, PreferenceRecord};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row};

const COLUMNS: &str =
    "id, preference, value, preferable_id, preferable_type, created_at, updated_at";

/// rusqlite-backed `PreferenceBackend`
///
/// Borrows the host's connection; the table name is fixed when the store is
/// built from its `PreferenceSettings`.
pub struct SqlitePreferenceStore<'c> {
    conn: &'c Connection,
    settings: PreferenceSettings,
}

/// Epoch-seconds column as a timestamp; out-of-range values are a
/// conversion failure, never replaced.
fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(idx)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {}", secs).into(),
        )
    })
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<PreferenceRecord> {
    Ok(PreferenceRecord {
        id: row.get(0)?,
        preference: row.get(1)?,
        value: row.get(2)?,
        preferable_id: row.get(3)?,
        preferable_type: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

impl<'c> SqlitePreferenceStore<'c> {
    pub fn new(conn: &'c Connection, settings: PreferenceSettings) -> Self {
        Self { conn, settings }
    }

    /// Store using settings resolved from the process environment
    pub fn from_env(conn: &'c Connection) -> Result<Self> {
        Ok(Self::new(conn, PreferenceSettings::from_env()?))
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    pub fn settings(&self) -> &PreferenceSettings {
        &self.settings
    }

    pub fn table(&self) -> &str {
        self.settings.table()
    }

    /// Look up a row by primary key, regardless of owner
    pub fn find(&self, id: i64) -> Result<Option<PreferenceRecord>> {
        let sql = format!("SELECT {} FROM \"{}\" WHERE id = ?1", COLUMNS, self.table());
        self.conn
            .query_row(&sql, [id], map_row)
            .optional()
            .map_err(from_rusqlite)
    }

    /// Every row in the table, ordered by id
    pub fn all(&self) -> Result<Vec<PreferenceRecord>> {
        let sql = format!("SELECT {} FROM \"{}\" ORDER BY id", COLUMNS, self.table());
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], map_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// JSON export of a row, honoring the hidden-attribute setting
    pub fn to_visible_json(&self, record: &PreferenceRecord) -> serde_json::Value {
        record.to_visible_json(self.settings.hidden_attributes())
    }
}

impl PreferenceBackend for SqlitePreferenceStore<'_> {
    fn find_preference(&self, owner: &OwnerRef, name: &str) -> Result<Option<PreferenceRecord>> {
        let sql = format!(
            "SELECT {} FROM \"{}\"
             WHERE preferable_type = ?1 AND preferable_id = ?2 AND preference = ?3
             ORDER BY id LIMIT 1",
            COLUMNS,
            self.table()
        );
        self.conn
            .query_row(
                &sql,
                rusqlite::params![owner.owner_type, owner.owner_id, name],
                map_row,
            )
            .optional()
            .map_err(from_rusqlite)
    }

    fn list_preferences(&self, owner: &OwnerRef) -> Result<Vec<PreferenceRecord>> {
        let sql = format!(
            "SELECT {} FROM \"{}\"
             WHERE preferable_type = ?1 AND preferable_id = ?2
             ORDER BY id",
            COLUMNS,
            self.table()
        );
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(rusqlite::params![owner.owner_type, owner.owner_id], map_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    fn insert_preference(
        &self,
        owner: &OwnerRef,
        name: &str,
        value: &str,
    ) -> Result<PreferenceRecord> {
        let now = Utc::now();
        let secs = now.timestamp();
        // Stored at second precision; report what a re-read would return
        let stamped = DateTime::from_timestamp(secs, 0).unwrap_or(now);
        let sql = format!(
            "INSERT INTO \"{}\" (preference, value, preferable_id, preferable_type, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            self.table()
        );
        self.conn
            .execute(
                &sql,
                rusqlite::params![name, value, owner.owner_id, owner.owner_type, secs, secs],
            )
            .map_err(from_rusqlite)?;

        Ok(PreferenceRecord {
            id: self.conn.last_insert_rowid(),
            preference: name.to_string(),
            value: value.to_string(),
            preferable_id: owner.owner_id,
            preferable_type: owner.owner_type.clone(),
            created_at: stamped,
            updated_at: stamped,
        })
    }

    fn update_preference_value(&self, id: i64, value: &str) -> Result<()> {
        let sql = format!(
            "UPDATE \"{}\" SET value = ?1, updated_at = ?2 WHERE id = ?3",
            self.table()
        );
        self.conn
            .execute(&sql, rusqlite::params![value, Utc::now().timestamp(), id])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn delete_preferences(&self, owner: &OwnerRef, filter: NameFilter<'_>) -> Result<usize> {
        let mut params = vec![
            Value::Text(owner.owner_type.clone()),
            Value::Integer(owner.owner_id),
        ];
        let name_clause = match filter {
            NameFilter::Exact(name) => {
                params.push(Value::Text(name.to_string()));
                " AND preference = ?3".to_string()
            }
            NameFilter::AnyOf([]) => return Ok(0),
            NameFilter::AnyOf(names) => {
                let placeholders: Vec<String> =
                    (0..names.len()).map(|i| format!("?{}", i + 3)).collect();
                params.extend(names.iter().map(|n| Value::Text(n.to_string())));
                format!(" AND preference IN ({})", placeholders.join(", "))
            }
            NameFilter::All => String::new(),
        };

        let sql = format!(
            "DELETE FROM \"{}\" WHERE preferable_type = ?1 AND preferable_id = ?2{}",
            self.table(),
            name_clause
        );
        self.conn
            .execute(&sql, rusqlite::params_from_iter(params))
            .map_err(from_rusqlite)
    }
}
