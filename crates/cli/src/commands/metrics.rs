//! Daily metrics job.
//!
//! # Usage
//!
//! ```bash
//! # Store today (business timezone)
//! cs-cli metrics store-daily
//!
//! # Store a specific day
//! cs-cli metrics store-daily --date 2024-04-01
//! ```
//!
//! # Environment Variables
//!
//! - `CONSOLE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CONSOLE_UTC_OFFSET` - Business timezone (default: +07:00)

use chrono::{FixedOffset, NaiveDate, Utc};
use thiserror::Error;

use cs_console_admin::config::{ConfigError, parse_utc_offset};
use cs_console_admin::services::{MetricsError, MetricsService};
use cs_console_admin::services::metrics::parse_metric_date;

use super::{CommandError, connect};

const DEFAULT_UTC_OFFSET: &str = "+07:00";

#[derive(Debug, Error)]
pub enum StoreDailyError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Business timezone from `CONSOLE_UTC_OFFSET`.
fn business_offset() -> Result<FixedOffset, ConfigError> {
    let value =
        std::env::var("CONSOLE_UTC_OFFSET").unwrap_or_else(|_| DEFAULT_UTC_OFFSET.to_owned());
    parse_utc_offset(&value)
}

/// The day to store: `date` if given, otherwise today at `offset`.
fn target_day(date: Option<&str>, offset: FixedOffset) -> Result<NaiveDate, MetricsError> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(value) => parse_metric_date(value),
        None => Ok(Utc::now().with_timezone(&offset).date_naive()),
    }
}

/// Compute one day's aggregates and upsert them into `daily_metrics`.
pub async fn store_daily(date: Option<&str>) -> Result<(), StoreDailyError> {
    let pool = connect().await?;
    let offset = business_offset()?;
    let day = target_day(date, offset)?;

    tracing::info!("Storing daily metrics for {day}...");
    let metrics = MetricsService::new(&pool, offset).store_daily(day).await?;

    tracing::info!(
        chats = metrics.chats,
        complaints = metrics.complaints,
        checkouts = metrics.checkouts,
        orders = metrics.orders,
        revenue = %metrics.revenue,
        "Daily metrics stored for {day}"
    );
    Ok(())
}
