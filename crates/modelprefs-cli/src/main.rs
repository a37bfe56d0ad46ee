//! modelprefs CLI
//!
//! Inspect and edit model preferences stored in a SQLite file

use clap::{Parser, Subcommand};
use modelprefs_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "modelprefs")]
#[command(about = "modelprefs - Typed key/value preferences for records", long_about = None)]
struct Cli {
    #[command(flatten)]
    store: commands::StoreOptions,

    /// Log operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read one preference, applying defaults and casts
    Get(commands::get::GetArgs),
    /// Create or overwrite one preference
    Set(commands::set::SetArgs),
    /// Print every preference row of a record as JSON
    List(commands::list::ListArgs),
    /// Remove named preferences, or all of them
    Clear(commands::clear::ClearArgs),
    /// Create or drop the preferences table
    Migrate(commands::migrate::MigrateArgs),
}

fn main() {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if cli.verbose {
        init(Profile::Development);
    }

    let result = match cli.command {
        Commands::Get(args) => commands::get::execute(&cli.store, args),
        Commands::Set(args) => commands::set::execute(&cli.store, args),
        Commands::List(args) => commands::list::execute(&cli.store, args),
        Commands::Clear(args) => commands::clear::execute(&cli.store, args),
        Commands::Migrate(args) => commands::migrate::execute(&cli.store, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
