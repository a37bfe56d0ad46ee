//! Get/set/clear capability for owning records
//!
//! A record opts in by implementing [`HasPreferences`]: it names its backend,
//! its polymorphic owner reference and (optionally) its declared defaults and
//! casts. Every method round-trips to the backend; nothing is cached.
//!
//! ```
//! use modelprefs_core::{
//!     HasPreferences, MemoryBackend, OwnerRef, PreferenceConfig, PreferenceValue,
//! };
//!
//! struct User<'a> {
//!     id: i64,
//!     store: &'a MemoryBackend,
//!     config: PreferenceConfig,
//! }
//!
//! impl HasPreferences for User<'_> {
//!     type Backend = MemoryBackend;
//!
//!     fn preference_backend(&self) -> &MemoryBackend {
//!         self.store
//!     }
//!
//!     fn preference_owner(&self) -> OwnerRef {
//!         OwnerRef::new("users", self.id)
//!     }
//!
//!     fn preference_config(&self) -> &PreferenceConfig {
//!         &self.config
//!     }
//! }
//!
//! let store = MemoryBackend::new();
//! let user = User {
//!     id: 1,
//!     store: &store,
//!     config: PreferenceConfig::new().with_cast("volume", "int"),
//! };
//!
//! user.set_preference("volume", "11").unwrap();
//! assert_eq!(
//!     user.get_preference("volume", None).unwrap(),
//!     Some(PreferenceValue::Int(11))
//! );
//! ```

use std::time::Instant;

use crate::backend::{NameFilter, PreferenceBackend};
use crate::cast::{cast_inbound, serialize_outbound};
use crate::errors::{ExError, Result};
use crate::model::{OwnerRef, PreferenceConfig, PreferenceRecord};
use crate::value::PreferenceValue;
use crate::{log_op_end, log_op_error, log_op_start};

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Relation accessor binding a backend to one owner and its declarations
pub struct Preferences<'a, B: PreferenceBackend + ?Sized> {
    backend: &'a B,
    owner: OwnerRef,
    config: &'a PreferenceConfig,
}

impl<'a, B: PreferenceBackend + ?Sized> Preferences<'a, B> {
    pub fn new(backend: &'a B, owner: OwnerRef, config: &'a PreferenceConfig) -> Self {
        Self {
            backend,
            owner,
            config,
        }
    }

    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    pub fn config(&self) -> &PreferenceConfig {
        self.config
    }

    /// All of the owner's rows, ordered by id
    pub fn all(&self) -> Result<Vec<PreferenceRecord>> {
        self.backend.list_preferences(&self.owner)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }

    /// The stored row for `name`, without casting
    pub fn find(&self, name: &str) -> Result<Option<PreferenceRecord>> {
        self.backend.find_preference(&self.owner, name)
    }

    fn in_context(&self, err: ExError, op: &str, name: Option<&str>) -> ExError {
        let err = err.with_owner(self.owner.to_string());
        let err = match name {
            Some(name) => err.with_preference(name),
            None => err,
        };
        if err.op().is_none() {
            err.with_op(op)
        } else {
            err
        }
    }

    /// Read a preference, falling back to the declared default, then
    /// `fallback`, then `None`. The result is cast by the declared tag.
    pub fn get(
        &self,
        name: &str,
        fallback: Option<PreferenceValue>,
    ) -> Result<Option<PreferenceValue>> {
        let started = Instant::now();
        log_op_start!(
            "get_preference",
            preference = name,
            owner_type = %self.owner.owner_type,
            owner_id = self.owner.owner_id
        );

        let result = self.resolve(name, fallback);
        match &result {
            Ok(value) => log_op_end!(
                "get_preference",
                duration_ms = elapsed_ms(started),
                preference = name,
                found = value.is_some()
            ),
            Err(err) => log_op_error!(
                "get_preference",
                err,
                duration_ms = elapsed_ms(started),
                preference = name
            ),
        }
        result
    }

    fn resolve(
        &self,
        name: &str,
        fallback: Option<PreferenceValue>,
    ) -> Result<Option<PreferenceValue>> {
        let raw = match self
            .find(name)
            .map_err(|e| self.in_context(e, "get_preference", Some(name)))?
        {
            Some(record) => Some(PreferenceValue::String(record.value)),
            None => self.config.default_for(name).cloned().or(fallback),
        };

        cast_inbound(self.config.cast_for(name), raw)
            .map_err(|e| self.in_context(e.into(), "get_preference", Some(name)))
    }

    /// Write a preference, updating the existing row or inserting a new one
    pub fn set(&self, name: &str, value: PreferenceValue) -> Result<()> {
        let started = Instant::now();
        log_op_start!(
            "set_preference",
            preference = name,
            owner_type = %self.owner.owner_type,
            owner_id = self.owner.owner_id
        );

        let result = self.write(name, &value);
        match &result {
            Ok(inserted) => log_op_end!(
                "set_preference",
                duration_ms = elapsed_ms(started),
                preference = name,
                inserted = *inserted
            ),
            Err(err) => log_op_error!(
                "set_preference",
                err,
                duration_ms = elapsed_ms(started),
                preference = name
            ),
        }
        result.map(|_| ())
    }

    /// Returns whether a new row was inserted
    fn write(&self, name: &str, value: &PreferenceValue) -> Result<bool> {
        let context = |e: ExError| self.in_context(e, "set_preference", Some(name));

        let stored = serialize_outbound(self.config.cast_for(name), value)
            .map_err(|e| context(e.into()))?;

        // Check-then-act: not guarded against a concurrent writer.
        match self.find(name).map_err(context)? {
            Some(existing) => {
                self.backend
                    .update_preference_value(existing.id, &stored)
                    .map_err(context)?;
                Ok(false)
            }
            None => {
                self.backend
                    .insert_preference(&self.owner, name, &stored)
                    .map_err(context)?;
                Ok(true)
            }
        }
    }

    /// Apply `set` per entry in iteration order. Not atomic: entries written
    /// before a failure stay written.
    pub fn set_many<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<PreferenceValue>,
    {
        for (name, value) in entries {
            self.set(name.as_ref(), value.into())?;
        }
        Ok(())
    }

    fn delete(&self, op: &'static str, filter: NameFilter<'_>) -> Result<usize> {
        let started = Instant::now();
        log_op_start!(
            op,
            owner_type = %self.owner.owner_type,
            owner_id = self.owner.owner_id
        );

        let result = self
            .backend
            .delete_preferences(&self.owner, filter)
            .map_err(|e| {
                let name = match filter {
                    NameFilter::Exact(name) => Some(name),
                    _ => None,
                };
                self.in_context(e, op, name)
            });
        match &result {
            Ok(removed) => log_op_end!(
                op,
                duration_ms = elapsed_ms(started),
                rows_affected = *removed as u64
            ),
            Err(err) => log_op_error!(op, err, duration_ms = elapsed_ms(started)),
        }
        result
    }

    /// Delete the row(s) named `name`; no-op when none exist
    pub fn clear(&self, name: &str) -> Result<usize> {
        self.delete("clear_preference", NameFilter::Exact(name))
    }

    /// Delete every row whose name is in `names`, in one backend call
    pub fn clear_many<S: AsRef<str>>(&self, names: &[S]) -> Result<usize> {
        let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        self.delete("clear_preferences", NameFilter::AnyOf(&names))
    }

    /// Delete every row owned by this record
    pub fn clear_all(&self) -> Result<usize> {
        self.delete("clear_all_preferences", NameFilter::All)
    }
}

/// Preference capability for an owning record
///
/// Mutators return `&Self` so calls can be chained:
/// `user.set_preference("a", 1)?.clear_preference("b")?;`
pub trait HasPreferences {
    type Backend: PreferenceBackend + ?Sized;

    fn preference_backend(&self) -> &Self::Backend;

    fn preference_owner(&self) -> OwnerRef;

    /// Declared defaults and casts; none unless overridden
    fn preference_config(&self) -> &PreferenceConfig {
        PreferenceConfig::empty()
    }

    fn preferences(&self) -> Preferences<'_, Self::Backend> {
        Preferences::new(
            self.preference_backend(),
            self.preference_owner(),
            self.preference_config(),
        )
    }

    fn get_preference(
        &self,
        name: &str,
        fallback: Option<PreferenceValue>,
    ) -> Result<Option<PreferenceValue>> {
        self.preferences().get(name, fallback)
    }

    /// Alias of [`HasPreferences::get_preference`]
    fn prefers(
        &self,
        name: &str,
        fallback: Option<PreferenceValue>,
    ) -> Result<Option<PreferenceValue>> {
        self.get_preference(name, fallback)
    }

    fn set_preference(&self, name: &str, value: impl Into<PreferenceValue>) -> Result<&Self> {
        self.preferences().set(name, value.into())?;
        Ok(self)
    }

    fn set_preferences<I, K, V>(&self, entries: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<PreferenceValue>,
    {
        self.preferences().set_many(entries)?;
        Ok(self)
    }

    fn clear_preference(&self, name: &str) -> Result<&Self> {
        self.preferences().clear(name)?;
        Ok(self)
    }

    fn clear_preferences<S: AsRef<str>>(&self, names: &[S]) -> Result<&Self> {
        self.preferences().clear_many(names)?;
        Ok(self)
    }

    fn clear_all_preferences(&self) -> Result<&Self> {
        self.preferences().clear_all()?;
        Ok(self)
    }
}
