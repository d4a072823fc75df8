//! Token usage report building.
//!
//! Groups `"TokenUsage"` rows into one zero-filled row per business day of
//! the selected window. When the table cannot be read, a synthetic report of
//! the same shape is generated so the screen still has something to show.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use rand::Rng;
use serde::Serialize;

use cs_console_core::{DateWindow, TimeRange, local_day};

use crate::db::TokenUsageRecord;

/// Ranges offered on the token usage screen.
pub const TOKEN_RANGES: [TimeRange; 5] = [
    TimeRange::Today,
    TimeRange::SevenDays,
    TimeRange::ThisWeek,
    TimeRange::ThirtyDays,
    TimeRange::ThisMonth,
];

/// Token counts for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDay {
    pub day: NaiveDate,
    /// Chart label, e.g. `Apr 01`.
    pub label: String,
    pub input: i64,
    pub output: i64,
    pub total: i64,
}

impl TokenDay {
    fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            label: day.format("%b %d").to_string(),
            input: 0,
            output: 0,
            total: 0,
        }
    }
}

/// The token usage screen's data.
#[derive(Debug, Clone)]
pub struct TokenUsageReport {
    pub range: TimeRange,
    pub window: DateWindow,
    pub days: Vec<TokenDay>,
    pub input_total: i64,
    pub output_total: i64,
    pub total: i64,
    /// Synthetic data shown because the real rows could not be read.
    pub is_demo: bool,
}

impl TokenUsageReport {
    fn from_days(range: TimeRange, window: DateWindow, days: Vec<TokenDay>, is_demo: bool) -> Self {
        let input_total = days.iter().map(|d| d.input).sum();
        let output_total = days.iter().map(|d| d.output).sum();
        let total = days.iter().map(|d| d.total).sum();
        Self {
            range,
            window,
            days,
            input_total,
            output_total,
            total,
            is_demo,
        }
    }

    /// Largest daily total, for scaling the chart.
    #[must_use]
    pub fn peak(&self) -> i64 {
        self.days.iter().map(|d| d.total).max().unwrap_or(0)
    }

    /// Bar height of `day` relative to the peak, 0-100.
    #[must_use]
    pub fn percent_of_peak(&self, day: &TokenDay) -> u32 {
        let peak = self.peak().max(1);
        u32::try_from(day.total.clamp(0, peak) * 100 / peak).unwrap_or(0)
    }
}

/// Group records into per-day rows for `window`.
///
/// Records outside the window are ignored.
#[must_use]
pub fn build_report(
    range: TimeRange,
    window: DateWindow,
    offset: FixedOffset,
    records: &[TokenUsageRecord],
) -> TokenUsageReport {
    let mut by_day: BTreeMap<NaiveDate, TokenDay> =
        window.days().map(|day| (day, TokenDay::empty(day))).collect();

    for record in records {
        let day = local_day(record.timestamp, offset);
        if let Some(row) = by_day.get_mut(&day) {
            row.input += record.input_token;
            row.output += record.output_token;
            row.total += record.total;
        }
    }

    TokenUsageReport::from_days(range, window, by_day.into_values().collect(), false)
}

/// A synthetic report for `window` with plausible random counts.
#[must_use]
pub fn demo_report(range: TimeRange, window: DateWindow, rng: &mut impl Rng) -> TokenUsageReport {
    let days = window
        .days()
        .map(|day| {
            let input = rng.random_range(1_000..11_000);
            let output = rng.random_range(800..8_800);
            TokenDay {
                input,
                output,
                total: input + output,
                ..TokenDay::empty(day)
            }
        })
        .collect();

    TokenUsageReport::from_days(range, window, days, true)
}

/// Short form of a token count: `950`, `1.5K`, `3.4M`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_compact(value: i64) -> String {
    let v = value as f64;
    if value.abs() >= 1_000_000 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if value.abs() >= 1_000 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use cs_console_core::TokenUsageId;

    use super::*;

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn record(at: DateTime<Utc>, input: i64, output: i64) -> TokenUsageRecord {
        TokenUsageRecord {
            id: TokenUsageId::new(1),
            timestamp: at,
            input_token: input,
            output_token: output,
            total: input + output,
        }
    }

    #[test]
    fn test_report_groups_by_local_day() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 7).unwrap();
        let window = TimeRange::SevenDays.window(today);
        let records = vec![
            // 2024-04-06 17:00 UTC is midnight of Apr 7 in +07:00
            record(Utc.with_ymd_and_hms(2024, 4, 6, 17, 0, 0).unwrap(), 100, 50),
            // one second earlier is still Apr 6 locally
            record(Utc.with_ymd_and_hms(2024, 4, 6, 16, 59, 59).unwrap(), 10, 5),
            // before the window
            record(Utc.with_ymd_and_hms(2024, 3, 31, 16, 0, 0).unwrap(), 999, 999),
        ];

        let report = build_report(TimeRange::SevenDays, window, wib(), &records);
        assert_eq!(report.days.len(), 7);
        assert_eq!(report.input_total, 110);
        assert_eq!(report.output_total, 55);
        assert_eq!(report.total, 165);

        let last = report.days.last().unwrap();
        assert_eq!(last.label, "Apr 07");
        assert_eq!(last.total, 150);
        assert_eq!(report.days.get(5).unwrap().total, 15);
        assert!(!report.is_demo);
    }

    #[test]
    fn test_demo_report_shape() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 7).unwrap();
        let window = TimeRange::ThirtyDays.window(today);
        let mut rng = StdRng::seed_from_u64(7);
        let report = demo_report(TimeRange::ThirtyDays, window, &mut rng);

        assert!(report.is_demo);
        assert_eq!(report.days.len(), 30);
        for day in &report.days {
            assert!((1_000..11_000).contains(&day.input));
            assert!((800..8_800).contains(&day.output));
            assert_eq!(day.total, day.input + day.output);
        }
        assert_eq!(report.total, report.input_total + report.output_total);
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(950), "950");
        assert_eq!(format_compact(1_000), "1.0K");
        assert_eq!(format_compact(1_500), "1.5K");
        assert_eq!(format_compact(3_400_000), "3.4M");
    }

    #[test]
    fn test_percent_of_peak() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 7).unwrap();
        let window = TimeRange::Today.window(today);
        let report = build_report(TimeRange::Today, window, wib(), &[]);
        let day = report.days.first().unwrap();
        assert_eq!(report.percent_of_peak(day), 0);
    }
}
