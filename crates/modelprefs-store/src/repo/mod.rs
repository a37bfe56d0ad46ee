//! Repository layer

pub mod sqlite_repo;

pub use sqlite_repo::SqlitePreferenceStore;
