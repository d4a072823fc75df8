//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cs-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CONSOLE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CONSOLE_MIGRATIONS_DIR` - Override the migrations directory
//!
//! # Migration Files
//!
//! Console migrations live in `crates/admin/migrations/`:
//! ```text
//! migrations/
//! ├── 20261001000001_create_console_schema.sql
//! ├── 20261001000002_create_users.sql
//! └── ...
//! ```

use std::path::PathBuf;

use sqlx::migrate::{MigrateError, Migrator};
use thiserror::Error;

use super::{CommandError, connect};

/// Migrations shipped with the console crate.
const DEFAULT_MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../admin/migrations");

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),
}

/// Directory to read migrations from.
fn migrations_dir() -> PathBuf {
    std::env::var("CONSOLE_MIGRATIONS_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_MIGRATIONS_DIR), PathBuf::from)
}

/// Run every pending console migration.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let dir = migrations_dir();
    tracing::info!("Running console migrations from {}...", dir.display());
    let migrator = Migrator::new(dir).await?;
    migrator.run(&pool).await?;

    tracing::info!("Console migrations complete!");
    Ok(())
}
