//! Dashboard metrics queries.
//!
//! Two sources feed the dashboard: `daily_metrics` rows written by the daily
//! job, and live counts over the raw tables for a single day. Every live
//! query takes a half-open `[start, end)` interval in UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use cs_console_core::DateWindow;

use super::RepositoryError;

/// Aggregated counts for one business day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DayMetrics {
    #[sqlx(rename = "metric_date")]
    pub day: NaiveDate,
    #[sqlx(rename = "total_chats")]
    pub chats: i64,
    #[sqlx(rename = "total_complaints")]
    pub complaints: i64,
    #[sqlx(rename = "total_checkouts")]
    pub checkouts: i64,
    #[sqlx(rename = "total_orders")]
    pub orders: i64,
    pub revenue: Decimal,
}

impl DayMetrics {
    /// An all-zero bucket for `day`.
    #[must_use]
    pub const fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            chats: 0,
            complaints: 0,
            checkouts: 0,
            orders: 0,
            revenue: Decimal::ZERO,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderTotalsRow {
    orders: i64,
    revenue: Decimal,
}

/// Repository for dashboard metrics.
pub struct MetricsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MetricsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Pre-aggregated rows for the days of `window` the daily job has stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stored_days(&self, window: DateWindow) -> Result<Vec<DayMetrics>, RepositoryError> {
        let rows = sqlx::query_as::<_, DayMetrics>(
            r"
            SELECT metric_date, total_chats, total_complaints, total_checkouts,
                   total_orders, revenue
            FROM daily_metrics
            WHERE metric_date BETWEEN $1 AND $2
            ORDER BY metric_date
            ",
        )
        .bind(window.first())
        .bind(window.last())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Conversation log entries in `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_chats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM conversations_log WHERE "timestamp" >= $1 AND "timestamp" < $2"#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Complaints raised in `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_complaints(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM "Keluhan" WHERE "Datetime" >= $1 AND "Datetime" < $2"#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Carts checked out in `[start, end)`, bucketed by their last update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_checkouts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM "Cart"
            WHERE is_checkout AND updated_at >= $1 AND updated_at < $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Orders created in `[start, end)` and the sum of their cart totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn order_totals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(i64, Decimal), RepositoryError> {
        let row = sqlx::query_as::<_, OrderTotalsRow>(
            r#"
            SELECT COUNT(o.id) AS orders,
                   COALESCE(SUM(c.total_pembayaran), 0)::numeric AS revenue
            FROM "Order" o
            LEFT JOIN "Cart" c ON c.id = o.id
            WHERE o.created_at >= $1 AND o.created_at < $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;
        Ok((row.orders, row.revenue))
    }

    /// Compute one day's metrics from the raw tables.
    ///
    /// The four counts run concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first `RepositoryError` any of the counts hit.
    pub async fn live_day(
        &self,
        day: NaiveDate,
        offset: FixedOffset,
    ) -> Result<DayMetrics, RepositoryError> {
        let window = DateWindow::single_day(day);
        let (start, end) = (window.start_utc(offset), window.end_utc(offset));

        let (chats, complaints, checkouts, totals) = tokio::join!(
            self.count_chats(start, end),
            self.count_complaints(start, end),
            self.count_checkouts(start, end),
            self.order_totals(start, end),
        );
        let (orders, revenue) = totals?;

        Ok(DayMetrics {
            day,
            chats: chats?,
            complaints: complaints?,
            checkouts: checkouts?,
            orders,
            revenue,
        })
    }

    /// Compute `day` in the database and upsert it into `daily_metrics`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the function call fails.
    pub async fn store_daily(
        &self,
        day: NaiveDate,
        offset: FixedOffset,
    ) -> Result<DayMetrics, RepositoryError> {
        let row = sqlx::query_as::<_, DayMetrics>(
            r"
            SELECT metric_date, total_chats, total_complaints, total_checkouts,
                   total_orders, revenue
            FROM store_daily_metrics($1, $2)
            ",
        )
        .bind(day)
        .bind(offset.local_minus_utc())
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }
}
