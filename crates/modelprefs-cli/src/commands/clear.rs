//! Clear command
//!
//! Usage: modelprefs clear <TYPE> <ID> [NAMES...]
//!
//! Without names every preference of the record is removed.

use super::{CommandResult, Record, StoreOptions};
use clap::Args;
use modelprefs_core::HasPreferences;
use modelprefs_store::SqlitePreferenceStore;

#[derive(Debug, Args)]
pub struct ClearArgs {
    pub owner_type: String,
    pub owner_id: i64,
    pub names: Vec<String>,
}

pub fn execute(options: &StoreOptions, args: ClearArgs) -> CommandResult {
    let (conn, settings) = options.open_existing(false)?;
    let store = SqlitePreferenceStore::new(&conn, settings);
    let record = Record::new(&store, &args.owner_type, args.owner_id);

    let removed = if args.names.is_empty() {
        record.preferences().clear_all()?
    } else {
        record.preferences().clear_many(&args.names)?
    };

    println!(
        "✓ Cleared {} preference(s) for {}",
        removed,
        record.preference_owner()
    );
    Ok(())
}
