//! CLI subcommands.

pub mod metrics;
pub mod migrate;
pub mod user;

use sqlx::PgPool;
use thiserror::Error;

use cs_console_admin::config::{ConfigError, get_database_url};
use cs_console_admin::db;

/// Errors shared by every command that touches the database.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Missing or invalid environment.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the console database named by `CONSOLE_DATABASE_URL` (or
/// `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("CONSOLE_DATABASE_URL")?;

    tracing::info!("Connecting to console database...");
    Ok(db::create_pool(&database_url).await?)
}
