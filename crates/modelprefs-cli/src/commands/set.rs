//! Set command
//!
//! Usage: modelprefs set <TYPE> <ID> <NAME> <VALUE> [--cast <TAG>] [--json]

use super::{CommandResult, Record, StoreOptions};
use clap::Args;
use modelprefs_core::{CastTag, HasPreferences, PreferenceValue};
use modelprefs_store::SqlitePreferenceStore;

#[derive(Debug, Args)]
pub struct SetArgs {
    pub owner_type: String,
    pub owner_id: i64,
    pub name: String,
    pub value: String,

    /// Cast tag applied on write
    #[arg(long)]
    pub cast: Option<String>,

    /// Parse VALUE as JSON (implied by object, array, json and collection casts)
    #[arg(long)]
    pub json: bool,
}

pub fn execute(options: &StoreOptions, args: SetArgs) -> CommandResult {
    let value = parse_value(&args.value, args.json, args.cast.as_deref())?;

    let (conn, settings) = options.open()?;
    let store = SqlitePreferenceStore::new(&conn, settings);
    let record = Record::new(&store, &args.owner_type, args.owner_id)
        .with_cast(&args.name, args.cast.as_deref());

    record.set_preference(&args.name, value)?;
    println!("✓ Set {} for {}", args.name, record.preference_owner());
    Ok(())
}

fn parse_value(
    raw: &str,
    json: bool,
    cast: Option<&str>,
) -> Result<PreferenceValue, serde_json::Error> {
    let structured = cast.map(|c| CastTag::parse(c).is_structured()).unwrap_or(false);
    if json || structured {
        Ok(PreferenceValue::Json(serde_json::from_str(raw)?))
    } else {
        Ok(PreferenceValue::from(raw))
    }
}
