//! modelprefs Store - SQLite persistence for model preferences
//!
//! Provides:
//! - Connection helpers
//! - Table name and hidden-attribute resolution (`PreferenceSettings`)
//! - Embedded, checksummed migrations for the preferences table
//! - `SqlitePreferenceStore`, the rusqlite-backed `PreferenceBackend`

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod settings;

// Re-export key types
pub use errors::Result;
pub use repo::SqlitePreferenceStore;
pub use settings::{PreferenceSettings, DEFAULT_MODEL_PREFERENCE_TABLE};
