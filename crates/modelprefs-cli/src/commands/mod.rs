//! Subcommands and the plumbing they share

pub mod clear;
pub mod get;
pub mod list;
pub mod migrate;
pub mod set;

use clap::Args;
use modelprefs_core::{HasPreferences, OwnerRef, PreferenceConfig};
use modelprefs_store::migrations::apply_migrations;
use modelprefs_store::{db, PreferenceSettings, SqlitePreferenceStore};
use rusqlite::Connection;
use std::path::PathBuf;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Where preferences live
#[derive(Debug, Args)]
pub struct StoreOptions {
    /// SQLite database file
    #[arg(
        long,
        global = true,
        env = "MODELPREFS_DB",
        default_value = ".modelprefs/store.db"
    )]
    pub db: PathBuf,

    /// Preferences table (overrides MODEL_PREFERENCE_TABLE)
    #[arg(long, global = true)]
    pub table: Option<String>,
}

impl StoreOptions {
    pub fn settings(&self) -> modelprefs_store::Result<PreferenceSettings> {
        let mut builder = PreferenceSettings::builder();
        if let Some(table) = &self.table {
            builder = builder.table(table.clone());
        }
        builder.build()
    }

    /// Open the database file, creating its directory if needed
    pub fn connect(&self) -> Result<Connection, Box<dyn std::error::Error>> {
        if let Some(parent) = self.db.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = db::open(&self.db)?;
        db::configure(&conn)?;
        Ok(conn)
    }

    /// Open an already-migrated database without creating anything
    ///
    /// `read_only` commands get a read-only connection; the file and the
    /// preferences table must both exist.
    pub fn open_existing(
        &self,
        read_only: bool,
    ) -> Result<(Connection, PreferenceSettings), Box<dyn std::error::Error>> {
        let settings = self.settings()?;
        if !self.db.exists() {
            return Err(format!(
                "database {} not found; run `modelprefs migrate` first",
                self.db.display()
            )
            .into());
        }
        let conn = if read_only {
            db::open_read_only(&self.db)?
        } else {
            db::open(&self.db)?
        };
        if !db::table_exists(&conn, settings.table())? {
            return Err(format!(
                "table {} not found in {}; run `modelprefs migrate` first",
                settings.table(),
                self.db.display()
            )
            .into());
        }
        Ok((conn, settings))
    }

    /// Open the database with the preferences table migrated
    pub fn open(
        &self,
    ) -> Result<(Connection, PreferenceSettings), Box<dyn std::error::Error>> {
        let settings = self.settings()?;
        let mut conn = self.connect()?;
        apply_migrations(&mut conn, &settings)?;
        Ok((conn, settings))
    }
}

/// A record addressed by `<type> <id>` on the command line
pub struct Record<'s, 'c> {
    owner: OwnerRef,
    store: &'s SqlitePreferenceStore<'c>,
    config: PreferenceConfig,
}

impl<'s, 'c> Record<'s, 'c> {
    pub fn new(store: &'s SqlitePreferenceStore<'c>, owner_type: &str, owner_id: i64) -> Self {
        Self {
            owner: OwnerRef::new(owner_type, owner_id),
            store,
            config: PreferenceConfig::new(),
        }
    }

    /// Declare a cast for `name` for the lifetime of this command
    pub fn with_cast(mut self, name: &str, cast: Option<&str>) -> Self {
        if let Some(cast) = cast {
            self.config = self.config.with_cast(name, cast);
        }
        self
    }
}

impl<'c> HasPreferences for Record<'_, 'c> {
    type Backend = SqlitePreferenceStore<'c>;

    fn preference_backend(&self) -> &SqlitePreferenceStore<'c> {
        self.store
    }

    fn preference_owner(&self) -> OwnerRef {
        self.owner.clone()
    }

    fn preference_config(&self) -> &PreferenceConfig {
        &self.config
    }
}
