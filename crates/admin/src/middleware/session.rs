//! Session middleware configuration for the console.
//!
//! `PostgreSQL`-backed sessions using tower-sessions, SameSite=Strict,
//! 12 hour inactivity expiry.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ConsoleConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cs_console_session";

/// Session expiry time in seconds (12 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the `PostgreSQL` session store (`console.session`).
///
/// The table is created by the migrations, not by the store.
///
/// # Panics
///
/// Panics if the schema or table name is invalid (never happens with the
/// hardcoded "console" and "session" values).
#[must_use]
#[allow(clippy::expect_used)]
pub fn create_session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
        .with_schema_name("console")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name")
}

/// Wrap any session store in the console's cookie settings.
///
/// Tests pass a `MemoryStore` here.
#[must_use]
pub fn session_layer<S>(store: S, config: &ConsoleConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Create the session layer with the `PostgreSQL` store.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &ConsoleConfig,
) -> SessionManagerLayer<PostgresStore> {
    session_layer(create_session_store(pool), config)
}
