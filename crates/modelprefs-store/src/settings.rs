//! Table name and hidden-attribute resolution
//!
//! Precedence, highest first: values set on the builder at runtime, then
//! `MODEL_PREFERENCE_TABLE` / `MODEL_PREFERENCE_HIDDEN_ATTRIBUTES` from the
//! environment, then the built-in defaults.

use config::{Config, Environment};
use modelprefs_core::errors::PreferenceError;
use serde::Deserialize;

use crate::errors::{config_error, Result};

/// Table used when nothing overrides it
pub const DEFAULT_MODEL_PREFERENCE_TABLE: &str = "model_preferences";

/// Environment prefix for overrides
pub const ENV_PREFIX: &str = "MODEL_PREFERENCE";

const KEY_TABLE: &str = "table";
const KEY_HIDDEN_ATTRIBUTES: &str = "hidden_attributes";

/// Resolved settings for one preference store
///
/// Only built through `Default` or `SettingsBuilder::build`, so the table
/// name has always passed `validate_table_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceSettings {
    table: String,
    hidden_attributes: Vec<String>,
}

/// Shape read from the layered config sources before validation
#[derive(Debug, Deserialize)]
struct RawSettings {
    table: String,
    #[serde(default)]
    hidden_attributes: Vec<String>,
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            table: DEFAULT_MODEL_PREFERENCE_TABLE.to_string(),
            hidden_attributes: Vec::new(),
        }
    }
}

impl PreferenceSettings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Resolve from the process environment with no runtime overrides
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Attributes removed when rows are exported as JSON
    pub fn hidden_attributes(&self) -> &[String] {
        &self.hidden_attributes
    }
}

/// Runtime overrides for `PreferenceSettings`
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    table: Option<String>,
    hidden_attributes: Option<Vec<String>>,
    environment: Option<config::Map<String, String>>,
}

impl SettingsBuilder {
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn hidden_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Read overrides from `vars` instead of the process environment
    pub fn environment(mut self, vars: config::Map<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    pub fn build(self) -> Result<PreferenceSettings> {
        let mut env = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key(KEY_HIDDEN_ATTRIBUTES);
        if let Some(vars) = self.environment {
            env = env.source(Some(vars));
        }

        let mut builder = Config::builder()
            .set_default(KEY_TABLE, DEFAULT_MODEL_PREFERENCE_TABLE)
            .map_err(config_error)?
            .set_default(KEY_HIDDEN_ATTRIBUTES, Vec::<String>::new())
            .map_err(config_error)?
            .add_source(env);
        if let Some(table) = self.table {
            builder = builder.set_override(KEY_TABLE, table).map_err(config_error)?;
        }
        if let Some(hidden) = self.hidden_attributes {
            builder = builder
                .set_override(KEY_HIDDEN_ATTRIBUTES, hidden)
                .map_err(config_error)?;
        }

        let raw = builder
            .build()
            .and_then(|config| config.try_deserialize::<RawSettings>())
            .map_err(config_error)?;

        let table = raw.table.trim().to_string();
        validate_table_name(&table)?;
        let hidden_attributes = raw
            .hidden_attributes
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        Ok(PreferenceSettings {
            table,
            hidden_attributes,
        })
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PreferenceError::InvalidTableName {
            name: name.to_string(),
        }
        .into())
    }
}
