//! Dashboard metrics aggregation.
//!
//! A dashboard request resolves a [`TimeRange`] to a window of business days,
//! reads the pre-aggregated `daily_metrics` rows for it, and computes every
//! day the daily job has not stored yet (always including today) straight
//! from the raw tables, one day at a time. The results are folded into one
//! zero-filled bucket per day plus window totals.
//!
//! Nothing here is cached and no failure is fatal: a day that cannot be
//! computed becomes an empty bucket and the result is marked degraded, which
//! the dashboard shows as a single toast.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use futures::{StreamExt, stream};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use cs_console_core::{DateWindow, Rupiah, TimeRange};

use crate::db::{DayMetrics, MetricsRepository, RepositoryError};

/// How many live days are computed at once.
const LIVE_DAY_CONCURRENCY: usize = 4;

/// Errors from the metrics service.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The requested date could not be parsed.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Window totals shown on the summary cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricTotals {
    pub chats: i64,
    pub complaints: i64,
    pub checkouts: i64,
    pub orders: i64,
    pub revenue: Rupiah,
}

impl MetricTotals {
    /// Sum a set of day buckets.
    #[must_use]
    pub fn from_buckets(buckets: &[DayMetrics]) -> Self {
        buckets.iter().fold(Self::default(), |mut acc, day| {
            acc.chats += day.chats;
            acc.complaints += day.complaints;
            acc.checkouts += day.checkouts;
            acc.orders += day.orders;
            acc.revenue += Rupiah::new(day.revenue);
            acc
        })
    }
}

/// One bar of a per-day chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: i64,
    /// Bar height relative to the tallest bar, 0-100.
    pub percent: u32,
}

/// Everything the dashboard renders for one window.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub range: TimeRange,
    pub window: DateWindow,
    pub buckets: Vec<DayMetrics>,
    pub totals: MetricTotals,
    /// Metrics for the business day containing "now".
    pub today: DayMetrics,
    /// At least one source failed and defaults were used.
    pub degraded: bool,
}

impl DashboardMetrics {
    /// Chart points for one metric, in day order.
    pub fn series(&self, pick: impl Fn(&DayMetrics) -> i64) -> Vec<ChartPoint> {
        chart_points(&self.buckets, pick)
    }
}

/// Fold day rows into exactly one bucket per day of `window`.
///
/// Days without a row get an empty bucket; rows outside the window are
/// dropped. When a day appears twice, the later row wins.
#[must_use]
pub fn fold_buckets(
    window: DateWindow,
    rows: impl IntoIterator<Item = DayMetrics>,
) -> Vec<DayMetrics> {
    let mut by_day: BTreeMap<NaiveDate, DayMetrics> = rows
        .into_iter()
        .filter(|row| window.contains_day(row.day))
        .map(|row| (row.day, row))
        .collect();

    window
        .days()
        .map(|day| by_day.remove(&day).unwrap_or_else(|| DayMetrics::empty(day)))
        .collect()
}

/// Days of `window` that must be computed live: not stored, not in the
/// future, and always `today`.
#[must_use]
pub fn days_to_compute(window: DateWindow, stored: &[DayMetrics], today: NaiveDate) -> Vec<NaiveDate> {
    window
        .days()
        .filter(|day| *day <= today)
        .filter(|day| *day == today || !stored.iter().any(|row| row.day == *day))
        .collect()
}

/// Scale a series to bar heights.
#[must_use]
pub fn chart_points(buckets: &[DayMetrics], pick: impl Fn(&DayMetrics) -> i64) -> Vec<ChartPoint> {
    let max = buckets.iter().map(&pick).max().unwrap_or(0).max(1);
    buckets
        .iter()
        .map(|day| {
            let value = pick(day);
            let percent = u32::try_from(value.clamp(0, max) * 100 / max).unwrap_or(0);
            ChartPoint {
                label: day.day.format("%d %b").to_string(),
                value,
                percent,
            }
        })
        .collect()
}

/// Metrics service over the console database.
pub struct MetricsService<'a> {
    metrics: MetricsRepository<'a>,
    offset: FixedOffset,
}

impl<'a> MetricsService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, offset: FixedOffset) -> Self {
        Self {
            metrics: MetricsRepository::new(pool),
            offset,
        }
    }

    /// Compute dashboard metrics for `range`, resolved against `today`.
    pub async fn dashboard(&self, range: TimeRange, today: NaiveDate) -> DashboardMetrics {
        let window = range.window(today);
        let mut degraded = false;

        let stored: Vec<DayMetrics> = match self.metrics.stored_days(window).await {
            Ok(rows) => rows.into_iter().filter(|row| row.day != today).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "daily_metrics unavailable, computing every day live");
                Vec::new()
            }
        };

        let pending = days_to_compute(window, &stored, today);
        tracing::debug!(
            stored = stored.len(),
            live = pending.len(),
            range = %range,
            "Computing dashboard metrics"
        );

        let live: Vec<DayMetrics> = stream::iter(pending)
            .map(|day| async move { (day, self.metrics.live_day(day, self.offset).await) })
            .buffered(LIVE_DAY_CONCURRENCY)
            .map(|(day, result)| {
                result.unwrap_or_else(|e| {
                    tracing::error!(error = %e, %day, "Failed to compute day metrics");
                    degraded = true;
                    DayMetrics::empty(day)
                })
            })
            .collect()
            .await;

        let buckets = fold_buckets(window, stored.into_iter().chain(live));
        let today_metrics = buckets
            .iter()
            .find(|row| row.day == today)
            .cloned()
            .unwrap_or_else(|| DayMetrics::empty(today));
        let totals = MetricTotals::from_buckets(&buckets);

        DashboardMetrics {
            range,
            window,
            buckets,
            totals,
            today: today_metrics,
            degraded,
        }
    }

    /// Compute and store one day in `daily_metrics`.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Repository` if the database call fails.
    pub async fn store_daily(&self, day: NaiveDate) -> Result<DayMetrics, MetricsError> {
        let row = self.metrics.store_daily(day, self.offset).await?;
        tracing::info!(%day, chats = row.chats, orders = row.orders, "Daily metrics stored");
        Ok(row)
    }
}

/// Parse a `YYYY-MM-DD` date for the daily job.
///
/// # Errors
///
/// Returns `MetricsError::InvalidDate` if the value is not a calendar date.
pub fn parse_metric_date(value: &str) -> Result<NaiveDate, MetricsError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| MetricsError::InvalidDate(value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day_with_chats(day: NaiveDate, chats: i64) -> DayMetrics {
        DayMetrics {
            chats,
            ..DayMetrics::empty(day)
        }
    }

    #[test]
    fn test_fold_zero_fills_every_day() {
        let window = DateWindow::new(date(2024, 4, 1), date(2024, 4, 7));
        let buckets = fold_buckets(window, vec![day_with_chats(date(2024, 4, 3), 5)]);

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets.first().unwrap().day, date(2024, 4, 1));
        assert_eq!(buckets.last().unwrap().day, date(2024, 4, 7));
        assert_eq!(buckets.iter().map(|b| b.chats).sum::<i64>(), 5);
        assert_eq!(buckets.get(2).unwrap().chats, 5);
    }

    #[test]
    fn test_fold_drops_rows_outside_window() {
        let window = DateWindow::single_day(date(2024, 4, 1));
        let buckets = fold_buckets(
            window,
            vec![
                day_with_chats(date(2024, 3, 31), 9),
                day_with_chats(date(2024, 4, 1), 2),
                day_with_chats(date(2024, 4, 2), 9),
            ],
        );
        assert_eq!(buckets, vec![day_with_chats(date(2024, 4, 1), 2)]);
    }

    #[test]
    fn test_live_days_are_missing_days_plus_today() {
        let today = date(2024, 4, 7);
        let window = TimeRange::SevenDays.window(today);
        let stored = vec![
            day_with_chats(date(2024, 4, 1), 1),
            day_with_chats(date(2024, 4, 2), 1),
            day_with_chats(date(2024, 4, 7), 1),
        ];

        assert_eq!(
            days_to_compute(window, &stored, today),
            vec![
                date(2024, 4, 3),
                date(2024, 4, 4),
                date(2024, 4, 5),
                date(2024, 4, 6),
                date(2024, 4, 7),
            ]
        );
    }

    #[test]
    fn test_future_days_of_this_month_are_not_queried() {
        let today = date(2024, 2, 27);
        let window = TimeRange::ThisMonth.window(today);
        let days = days_to_compute(window, &[], today);

        assert_eq!(days.len(), 27);
        assert_eq!(days.last(), Some(&today));
        assert_eq!(fold_buckets(window, Vec::new()).len(), 29);
    }

    #[test]
    fn test_totals_sum_buckets() {
        let mut a = DayMetrics::empty(date(2024, 4, 1));
        a.chats = 3;
        a.orders = 1;
        a.revenue = Decimal::new(150_000, 0);
        let mut b = DayMetrics::empty(date(2024, 4, 2));
        b.chats = 4;
        b.complaints = 2;
        b.checkouts = 1;
        b.revenue = Decimal::new(50_000, 0);

        let totals = MetricTotals::from_buckets(&[a, b]);
        assert_eq!(totals.chats, 7);
        assert_eq!(totals.complaints, 2);
        assert_eq!(totals.checkouts, 1);
        assert_eq!(totals.orders, 1);
        assert_eq!(totals.revenue.grouped(), "200.000");
    }

    #[test]
    fn test_chart_points_scale_to_tallest_bar() {
        let buckets = vec![
            day_with_chats(date(2024, 4, 1), 0),
            day_with_chats(date(2024, 4, 2), 5),
            day_with_chats(date(2024, 4, 3), 10),
        ];
        let points = chart_points(&buckets, |d| d.chats);
        let percents: Vec<u32> = points.iter().map(|p| p.percent).collect();
        assert_eq!(percents, vec![0, 50, 100]);
        assert_eq!(points.first().unwrap().label, "01 Apr");
    }

    #[test]
    fn test_chart_points_all_zero() {
        let buckets = vec![DayMetrics::empty(date(2024, 4, 1))];
        assert_eq!(chart_points(&buckets, |d| d.chats).first().unwrap().percent, 0);
    }

    #[test]
    fn test_parse_metric_date() {
        assert_eq!(parse_metric_date("2024-04-01").unwrap(), date(2024, 4, 1));
        assert!(matches!(
            parse_metric_date("01/04/2024"),
            Err(MetricsError::InvalidDate(_))
        ));
    }
}
