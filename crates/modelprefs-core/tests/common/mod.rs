#![allow(dead_code)]

use std::sync::OnceLock;

use modelprefs_core::{HasPreferences, MemoryBackend, OwnerRef, PreferenceConfig};

/// Declarations shared by every `TestUser`
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

pub struct TestUser<'a> {
    pub id: i64,
    pub email: String,
    pub store: &'a MemoryBackend,
}

impl<'a> TestUser<'a> {
    pub fn new(id: i64, store: &'a MemoryBackend) -> Self {
        Self {
            id,
            email: format!("user{}@example.org", id),
            store,
        }
    }
}

impl HasPreferences for TestUser<'_> {
    type Backend = MemoryBackend;

    fn preference_backend(&self) -> &MemoryBackend {
        self.store
    }

    fn preference_owner(&self) -> OwnerRef {
        OwnerRef::new("users", self.id)
    }

    fn preference_config(&self) -> &PreferenceConfig {
        user_config()
    }
}

/// A record type that declares nothing
pub struct Team<'a> {
    pub id: i64,
    pub store: &'a MemoryBackend,
}

impl HasPreferences for Team<'_> {
    type Backend = MemoryBackend;

    fn preference_backend(&self) -> &MemoryBackend {
        self.store
    }

    fn preference_owner(&self) -> OwnerRef {
        OwnerRef::new("teams", self.id)
    }
}
