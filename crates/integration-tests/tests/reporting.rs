//! Date windows, day buckets and token usage reports.

#![allow(clippy::unwrap_used)]

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;

use cs_console_admin::db::{DayMetrics, TokenUsageRecord};
use cs_console_admin::services::metrics::{chart_points, days_to_compute};
use cs_console_admin::services::{MetricTotals, build_report, demo_report, fold_buckets};
use cs_console_core::{DateWindow, Rupiah, TimeRange, TokenUsageId, local_day};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn jakarta() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap()
}

fn metrics(on: NaiveDate, chats: i64, orders: i64, revenue: i64) -> DayMetrics {
    DayMetrics {
        chats,
        orders,
        revenue: Decimal::new(revenue, 0),
        ..DayMetrics::empty(on)
    }
}

#[test]
fn test_window_boundaries_follow_business_timezone() {
    let window = TimeRange::Today.window(day(2024, 4, 2));

    assert_eq!(
        window.start_utc(jakarta()),
        Utc.with_ymd_and_hms(2024, 4, 1, 17, 0, 0).unwrap()
    );
    assert_eq!(
        window.end_utc(jakarta()),
        Utc.with_ymd_and_hms(2024, 4, 2, 17, 0, 0).unwrap()
    );

    // 23:30 local on the 1st, and exactly midnight local on the 3rd.
    let late = Utc.with_ymd_and_hms(2024, 4, 1, 16, 30, 0).unwrap();
    let midnight = Utc.with_ymd_and_hms(2024, 4, 2, 17, 0, 0).unwrap();
    assert!(!window.contains_instant(late, jakarta()));
    assert!(!window.contains_instant(midnight, jakarta()));
    assert_eq!(local_day(midnight, jakarta()), day(2024, 4, 3));
}

#[test]
fn test_dashboard_buckets_are_zero_filled_and_summed() {
    let today = day(2024, 4, 7);
    let window = TimeRange::SevenDays.window(today);

    let rows = vec![
        metrics(day(2024, 4, 1), 10, 2, 250_000),
        metrics(day(2024, 4, 3), 4, 1, 99_000),
        // Outside the window
        metrics(day(2024, 3, 31), 100, 50, 1_000_000),
        metrics(day(2024, 4, 7), 6, 0, 0),
    ];

    let buckets = fold_buckets(window, rows);
    assert_eq!(buckets.len(), 7);
    assert_eq!(buckets[0].day, day(2024, 4, 1));
    assert_eq!(buckets[1], DayMetrics::empty(day(2024, 4, 2)));
    assert_eq!(buckets[6].chats, 6);

    let totals = MetricTotals::from_buckets(&buckets);
    assert_eq!(totals.chats, 20);
    assert_eq!(totals.orders, 3);
    assert_eq!(totals.revenue, Rupiah::new(Decimal::new(349_000, 0)));

    let points = chart_points(&buckets, |d| d.chats);
    assert_eq!(points[0].label, "01 Apr");
    assert_eq!(points[0].percent, 100);
    assert_eq!(points[1].percent, 0);
    assert_eq!(points[6].percent, 60);
}

#[test]
fn test_only_missing_past_days_and_today_are_computed() {
    let today = day(2024, 4, 10);
    let window = TimeRange::ThisMonth.window(today);
    assert_eq!(window.last(), day(2024, 4, 30));

    let stored: Vec<DayMetrics> = (1..=9)
        .filter(|d| *d != 5)
        .map(|d| DayMetrics::empty(day(2024, 4, d)))
        .chain(std::iter::once(DayMetrics::empty(today)))
        .collect();

    assert_eq!(
        days_to_compute(window, &stored, today),
        vec![day(2024, 4, 5), today]
    );
}

#[test]
fn test_token_report_groups_by_local_day() {
    let window = DateWindow::new(day(2024, 4, 1), day(2024, 4, 3));
    let record = |id, at, input, output| TokenUsageRecord {
        id: TokenUsageId::new(id),
        timestamp: at,
        input_token: input,
        output_token: output,
        total: input + output,
    };

    let records = [
        // 01:00 local on Apr 1
        record(1, Utc.with_ymd_and_hms(2024, 3, 31, 18, 0, 0).unwrap(), 1_200, 300),
        // 23:00 local on Mar 31, outside the window
        record(2, Utc.with_ymd_and_hms(2024, 3, 31, 16, 0, 0).unwrap(), 9_999, 9_999),
        record(3, Utc.with_ymd_and_hms(2024, 4, 1, 5, 0, 0).unwrap(), 800, 200),
        record(4, Utc.with_ymd_and_hms(2024, 4, 3, 2, 0, 0).unwrap(), 500, 500),
    ];

    let report = build_report(TimeRange::SevenDays, window, jakarta(), &records);

    assert!(!report.is_demo);
    let totals: Vec<i64> = report.days.iter().map(|d| d.total).collect();
    assert_eq!(totals, vec![2_500, 0, 1_000]);
    assert_eq!(report.input_total, 2_500);
    assert_eq!(report.output_total, 1_000);
    assert_eq!(report.total, 3_500);
    assert_eq!(report.days[0].label, "Apr 01");
    assert_eq!(report.percent_of_peak(&report.days[2]), 40);
}

#[test]
fn test_demo_report_covers_the_window() {
    let window = TimeRange::SevenDays.window(day(2024, 4, 7));
    let mut rng = StdRng::seed_from_u64(11);

    let report = demo_report(TimeRange::SevenDays, window, &mut rng);

    assert!(report.is_demo);
    assert_eq!(report.days.len(), 7);
    assert!(report.days.iter().all(|d| d.total == d.input + d.output && d.total > 0));
    assert_eq!(report.total, report.days.iter().map(|d| d.total).sum::<i64>());
}
