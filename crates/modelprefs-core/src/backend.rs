//! Persistence seam for preference rows
//!
//! The capability never touches a database directly; it drives one of these.

use crate::errors::Result;
use crate::model::{OwnerRef, PreferenceRecord};

/// Which of an owner's rows a delete applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFilter<'a> {
    /// Rows with exactly this name
    Exact(&'a str),
    /// Rows whose name is in the set; an empty set matches nothing
    AnyOf(&'a [&'a str]),
    /// Every row of the owner
    All,
}

impl NameFilter<'_> {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::Exact(wanted) => *wanted == name,
            NameFilter::AnyOf(names) => names.contains(&name),
            NameFilter::All => true,
        }
    }
}

/// Row-level operations on the preferences table
///
/// Implementations are synchronous and stateless between calls; every call
/// reflects the current contents of the store.
pub trait PreferenceBackend {
    /// Oldest row for `(owner, name)`, if any
    fn find_preference(&self, owner: &OwnerRef, name: &str) -> Result<Option<PreferenceRecord>>;

    /// All rows for `owner`, ordered by id
    fn list_preferences(&self, owner: &OwnerRef) -> Result<Vec<PreferenceRecord>>;

    /// Insert a new row and return it with its assigned id
    fn insert_preference(
        &self,
        owner: &OwnerRef,
        name: &str,
        value: &str,
    ) -> Result<PreferenceRecord>;

    /// Overwrite the value of an existing row
    fn update_preference_value(&self, id: i64, value: &str) -> Result<()>;

    /// Delete the owner's rows selected by `filter`, returning how many went
    fn delete_preferences(&self, owner: &OwnerRef, filter: NameFilter<'_>) -> Result<usize>;
}

impl<B: PreferenceBackend + ?Sized> PreferenceBackend for &B {
    fn find_preference(&self, owner: &OwnerRef, name: &str) -> Result<Option<PreferenceRecord>> {
        (**self).find_preference(owner, name)
    }

    fn list_preferences(&self, owner: &OwnerRef) -> Result<Vec<PreferenceRecord>> {
        (**self).list_preferences(owner)
    }

    fn insert_preference(
        &self,
        owner: &OwnerRef,
        name: &str,
        value: &str,
    ) -> Result<PreferenceRecord> {
        (**self).insert_preference(owner, name, value)
    }

    fn update_preference_value(&self, id: i64, value: &str) -> Result<()> {
        (**self).update_preference_value(id, value)
    }

    fn delete_preferences(&self, owner: &OwnerRef, filter: NameFilter<'_>) -> Result<usize> {
        (**self).delete_preferences(owner, filter)
    }
}
