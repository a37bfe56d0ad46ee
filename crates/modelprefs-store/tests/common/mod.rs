#![allow(dead_code)]

use std::sync::OnceLock;

use modelprefs_core::{HasPreferences, OwnerRef, PreferenceConfig};
use modelprefs_store::migrations::apply_migrations;
use modelprefs_store::{db, PreferenceSettings, SqlitePreferenceStore};
use rusqlite::Connection;

/// In-memory database with the preferences table migrated
pub fn setup_test_db(settings: &PreferenceSettings) -> Connection {
    let mut conn = db::open_in_memory().expect("Failed to create in-memory database");
    apply_migrations(&mut conn, settings).expect("Failed to apply migrations");
    conn
}

pub fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

pub fn user_config() -> &'static PreferenceConfig {
    static CONFIG: OnceLock<PreferenceConfig> = OnceLock::new();
    CONFIG.get_or_init(|| {
        PreferenceConfig::new()
            .with_default("model defined default", "defined by model")
            .with_cast("int-preference", "int")
            .with_cast("integer-preference", "integer")
            .with_cast("real-preference", "real")
            .with_cast("float-preference", "float")
            .with_cast("double-preference", "double")
            .with_cast("string-preference", "string")
            .with_cast("bool-preference", "bool")
            .with_cast("boolean-preference", "boolean")
            .with_cast("object-preference", "object")
            .with_cast("array-preference", "array")
            .with_cast("json-preference", "json")
            .with_cast("collection-preference", "collection")
            .with_cast("date-preference", "date")
            .with_cast("datetime-preference", "datetime")
            .with_cast("timestamp-preference", "timestamp")
            .with_cast("decimal-preference", "decimal:2")
            .with_cast("undefined-type-preference", "undefined")
    })
}

/// A user record whose preferences live in SQLite
pub struct User<'s, 'c> {
    pub id: i64,
    pub store: &'s SqlitePreferenceStore<'c>,
}

impl std::fmt::Debug for User<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User").field("id", &self.id).finish_non_exhaustive()
    }
}

impl<'c> HasPreferences for User<'_, 'c> {
    type Backend = SqlitePreferenceStore<'c>;

    fn preference_backend(&self) -> &SqlitePreferenceStore<'c> {
        self.store
    }

    fn preference_owner(&self) -> OwnerRef {
        OwnerRef::new("users", self.id)
    }

    fn preference_config(&self) -> &PreferenceConfig {
        user_config()
    }
}
