//! Database operations for the console's `PostgreSQL`.
//!
//! # Tables
//!
//! - `users` - Console staff (argon2 password hashes, `admin`/`operator` role)
//! - `console.session` - Session storage
//! - `"User"` - Bot hold list, one row per customer phone number
//! - `"Produk"` / `"Promo"` - Catalog and promotions
//! - `"Order"` / `"Cart"` - Orders and the cart sharing each order's id
//! - `"Keluhan"` - Customer complaints
//! - `"CustomerJourney"` - Funnel stage per message, with follow-up flag
//! - `"TokenUsage"` - LLM token accounting written by the bot
//! - `"AIPrompt"` - Style CS prompt read by the bot
//! - `conversations_log` - Raw chat log
//! - `daily_metrics` - Pre-aggregated dashboard counts
//!
//! Most tables are written by the bot too, so their quoted legacy names are
//! kept as-is.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p cs-console-cli -- migrate
//! ```

pub mod complaints;
pub mod holds;
pub mod journeys;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod promos;
pub mod style_prompts;
pub mod token_usage;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use complaints::{Complaint, ComplaintFilter, ComplaintRepository};
pub use holds::{Hold, HoldRepository, HoldSummary};
pub use journeys::{Journey, JourneyInput, JourneyMetrics, JourneyRepository};
pub use metrics::{DayMetrics, MetricsRepository};
pub use orders::{OrderRepository, OrderSummary, OrderWithCart};
pub use products::{Product, ProductInput, ProductRepository};
pub use promos::{Promo, PromoInput, PromoRepository};
pub use style_prompts::{StylePrompt, StylePromptRepository};
pub use token_usage::{TokenUsageRecord, TokenUsageRepository};
pub use users::{StaffUser, StaffUserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
