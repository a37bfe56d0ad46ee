//! Migrate command
//!
//! Usage: modelprefs migrate [--rollback]

use super::{CommandResult, StoreOptions};
use clap::Args;
use modelprefs_store::migrations::{applied_migrations, apply_migrations, rollback_migrations};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Drop the preferences table instead of creating it
    #[arg(long)]
    pub rollback: bool,
}

pub fn execute(options: &StoreOptions, args: MigrateArgs) -> CommandResult {
    let settings = options.settings()?;
    let mut conn = options.connect()?;

    if args.rollback {
        rollback_migrations(&mut conn, &settings)?;
        println!("✓ Rolled back migrations for {}", settings.table());
    } else {
        apply_migrations(&mut conn, &settings)?;
        for id in applied_migrations(&conn, settings.table())? {
            println!("✓ {} ({})", id, settings.table());
        }
    }

    Ok(())
}
