//! Migration framework
//!
//! Provides:
//! - Migration runner with checksums and idempotent re-application
//! - Rollback of the preferences table
//! - Embedded SQL migrations, templated on the configured table name

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations, rollback_migrations};
