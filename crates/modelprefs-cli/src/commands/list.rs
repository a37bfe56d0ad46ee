//! List command
//!
//! Usage: modelprefs list <TYPE> <ID>

use super::{CommandResult, Record, StoreOptions};
use clap::Args;
use modelprefs_core::HasPreferences;
use modelprefs_store::SqlitePreferenceStore;

#[derive(Debug, Args)]
pub struct ListArgs {
    pub owner_type: String,
    pub owner_id: i64,
}

pub fn execute(options: &StoreOptions, args: ListArgs) -> CommandResult {
    let (conn, settings) = options.open_existing(true)?;
    let store = SqlitePreferenceStore::new(&conn, settings);
    let record = Record::new(&store, &args.owner_type, args.owner_id);

    let rows: Vec<serde_json::Value> = record
        .preferences()
        .all()?
        .iter()
        .map(|row| store.to_visible_json(row))
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
