//! Preference rows, owner references and per-model declarations

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cast::CastTag;
use crate::value::PreferenceValue;

/// Polymorphic reference to an owning record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerRef {
    /// Type discriminator, e.g. `"users"`
    pub owner_type: String,
    pub owner_id: i64,
}

impl OwnerRef {
    pub fn new(owner_type: impl Into<String>, owner_id: i64) -> Self {
        Self {
            owner_type: owner_type.into(),
            owner_id,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner_type, self.owner_id)
    }
}

/// One stored preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub id: i64,
    pub preference: String,
    pub value: String,
    pub preferable_id: i64,
    pub preferable_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PreferenceRecord {
    /// The record that owns this preference
    pub fn preferable(&self) -> OwnerRef {
        OwnerRef::new(self.preferable_type.clone(), self.preferable_id)
    }

    /// JSON export with the given attributes removed
    pub fn to_visible_json(&self, hidden: &[String]) -> serde_json::Value {
        let mut json = serde_json::json!({
            "id": self.id,
            "preference": self.preference,
            "value": self.value,
            "preferable_id": self.preferable_id,
            "preferable_type": self.preferable_type,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        });
        if let Some(map) = json.as_object_mut() {
            for attribute in hidden {
                map.remove(attribute);
            }
        }
        json
    }
}

/// Defaults and cast tags declared by an owning record type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceConfig {
    defaults: BTreeMap<String, PreferenceValue>,
    casts: BTreeMap<String, CastTag>,
}

static EMPTY_CONFIG: PreferenceConfig = PreferenceConfig {
    defaults: BTreeMap::new(),
    casts: BTreeMap::new(),
};

impl PreferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared config with no defaults and no casts
    pub fn empty() -> &'static PreferenceConfig {
        &EMPTY_CONFIG
    }

    /// Declare the value returned when no row exists for `name`
    pub fn with_default(
        mut self,
        name: impl Into<String>,
        value: impl Into<PreferenceValue>,
    ) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Declare the cast tag for `name`, e.g. `"int"` or `"decimal:2"`
    pub fn with_cast(mut self, name: impl Into<String>, tag: &str) -> Self {
        self.casts.insert(name.into(), CastTag::parse(tag));
        self
    }

    pub fn default_for(&self, name: &str) -> Option<&PreferenceValue> {
        self.defaults.get(name)
    }

    pub fn cast_for(&self, name: &str) -> Option<&CastTag> {
        self.casts.get(name)
    }

    pub fn defaults(&self) -> &BTreeMap<String, PreferenceValue> {
        &self.defaults
    }

    pub fn casts(&self) -> &BTreeMap<String, CastTag> {
        &self.casts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> PreferenceRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PreferenceRecord {
            id: 1,
            preference: "theme".to_string(),
            value: "dark".to_string(),
            preferable_id: 7,
            preferable_type: "users".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_preferable_points_at_owner() {
        assert_eq!(record().preferable(), OwnerRef::new("users", 7));
        assert_eq!(OwnerRef::new("users", 7).to_string(), "users#7");
    }

    #[test]
    fn test_visible_json_drops_hidden_attributes() {
        let hidden = vec!["preferable_type".to_string(), "created_at".to_string()];
        let json = record().to_visible_json(&hidden);
        let map = json.as_object().unwrap();
        assert!(!map.contains_key("preferable_type"));
        assert!(!map.contains_key("created_at"));
        assert_eq!(map["value"], "dark");
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_config_declarations() {
        let config = PreferenceConfig::new()
            .with_default("theme", "light")
            .with_cast("count", "integer");
        assert_eq!(config.default_for("theme"), Some(&PreferenceValue::from("light")));
        assert_eq!(config.cast_for("count"), Some(&CastTag::Int));
        assert!(config.cast_for("theme").is_none());
        assert!(PreferenceConfig::empty().defaults().is_empty());
    }
}
