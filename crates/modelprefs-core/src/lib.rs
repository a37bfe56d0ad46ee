//! modelprefs Core - typed key/value preferences for arbitrary records
//!
//! This crate provides the storage-agnostic half of modelprefs:
//! - `PreferenceValue` and `Collection`, the typed view of a stored string
//! - `CastTag` and the inbound/outbound cast pipeline
//! - `OwnerRef`, `PreferenceRecord` and `PreferenceConfig`
//! - The `PreferenceBackend` seam plus an in-memory backend
//! - The `HasPreferences` capability and its `Preferences` relation accessor
//! - The structured error and logging facilities shared by every crate

pub mod backend;
pub mod capability;
pub mod cast;
pub mod errors;
pub mod logging_facility;
pub mod memory;
pub mod model;
pub mod value;

// Logging macros expand to paths inside this crate.
pub use modelprefs_core_types;

// Re-export commonly used types
pub use backend::{NameFilter, PreferenceBackend};
pub use capability::{HasPreferences, Preferences};
pub use cast::CastTag;
pub use errors::{ExError, ExErrorKind, PreferenceError, Result};
pub use memory::MemoryBackend;
pub use model::{OwnerRef, PreferenceConfig, PreferenceRecord};
pub use value::{Collection, PreferenceValue, STORE_DATE_FORMAT};
