//! In-memory backend
//!
//! Keeps rows in insertion order; lookups and deletes mirror the SQLite
//! backend (oldest row wins, clears remove every match).

use std::cell::{Cell, RefCell};

use chrono::Utc;

use crate::backend::{NameFilter, PreferenceBackend};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::{OwnerRef, PreferenceRecord};

/// In-memory preference backend
///
/// Vec-backed rows with ids assigned in insertion order. Not thread-safe;
/// intended for tests and for hosts that do not need persistence.
#[derive(Debug)]
pub struct MemoryBackend {
    rows: RefCell<Vec<PreferenceRecord>>,
    next_id: Cell<i64>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            rows: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Every stored row across all owners
    pub fn rows(&self) -> Vec<PreferenceRecord> {
        self.rows.borrow().clone()
    }

    /// Find any row by id, regardless of owner
    pub fn find_by_id(&self, id: i64) -> Option<PreferenceRecord> {
        self.rows.borrow().iter().find(|r| r.id == id).cloned()
    }
}

fn owned_by(row: &PreferenceRecord, owner: &OwnerRef) -> bool {
    row.preferable_id == owner.owner_id && row.preferable_type == owner.owner_type
}

impl PreferenceBackend for MemoryBackend {
    fn find_preference(&self, owner: &OwnerRef, name: &str) -> Result<Option<PreferenceRecord>> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .find(|r| owned_by(r, owner) && r.preference == name)
            .cloned())
    }

    fn list_preferences(&self, owner: &OwnerRef) -> Result<Vec<PreferenceRecord>> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|r| owned_by(r, owner))
            .cloned()
            .collect())
    }

    fn insert_preference(
        &self,
        owner: &OwnerRef,
        name: &str,
        value: &str,
    ) -> Result<PreferenceRecord> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let now = Utc::now();
        let record = PreferenceRecord {
            id,
            preference: name.to_string(),
            value: value.to_string(),
            preferable_id: owner.owner_id,
            preferable_type: owner.owner_type.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.borrow_mut().push(record.clone());
        Ok(record)
    }

    fn update_preference_value(&self, id: i64, value: &str) -> Result<()> {
        let mut rows = self.rows.borrow_mut();
        let row = rows.iter_mut().find(|r| r.id == id).ok_or_else(|| {
            ExError::new(ExErrorKind::Persistence)
                .with_op("update_preference_value")
                .with_message(format!("No preference row with id {}", id))
        })?;
        row.value = value.to_string();
        row.updated_at = Utc::now();
        Ok(())
    }

    fn delete_preferences(&self, owner: &OwnerRef, filter: NameFilter<'_>) -> Result<usize> {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|r| !(owned_by(r, owner) && filter.matches(&r.preference)));
        Ok(before - rows.len())
    }
}
