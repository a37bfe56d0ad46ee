//! Get command
//!
//! Usage: modelprefs get <TYPE> <ID> <NAME> [--cast <TAG>] [--default <VALUE>]

use super::{CommandResult, Record, StoreOptions};
use clap::Args;
use modelprefs_core::{HasPreferences, PreferenceValue};
use modelprefs_store::SqlitePreferenceStore;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Owner type, e.g. `users`
    pub owner_type: String,
    pub owner_id: i64,
    pub name: String,

    /// Cast tag applied on read (e.g. `int`, `json`, `decimal:2`)
    #[arg(long)]
    pub cast: Option<String>,

    /// Value returned when nothing is stored
    #[arg(long)]
    pub default: Option<String>,
}

pub fn execute(options: &StoreOptions, args: GetArgs) -> CommandResult {
    let (conn, settings) = options.open_existing(true)?;
    let store = SqlitePreferenceStore::new(&conn, settings);
    let record = Record::new(&store, &args.owner_type, args.owner_id)
        .with_cast(&args.name, args.cast.as_deref());

    let value = record.get_preference(&args.name, args.default.map(PreferenceValue::from))?;
    println!("{}", render(value.as_ref()));
    Ok(())
}

/// Strings print bare; everything else prints as JSON. Absent is `null`.
pub fn render(value: Option<&PreferenceValue>) -> String {
    match value {
        Some(PreferenceValue::String(s)) => s.clone(),
        Some(other) => other.to_json().to_string(),
        None => "null".to_string(),
    }
}
