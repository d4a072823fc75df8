//! Reporting time ranges and the calendar windows they resolve to.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TimeRange`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown time range: {0}")]
pub struct TimeRangeError(pub String);

/// A named reporting range selectable on the dashboard and token usage pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeRange {
    #[serde(rename = "today")]
    Today,
    #[default]
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "1year")]
    OneYear,
    #[serde(rename = "this_week")]
    ThisWeek,
    #[serde(rename = "this_month")]
    ThisMonth,
}

impl TimeRange {
    /// Every range in the order the range picker shows them.
    pub const ALL: [Self; 6] = [
        Self::Today,
        Self::SevenDays,
        Self::ThirtyDays,
        Self::OneYear,
        Self::ThisWeek,
        Self::ThisMonth,
    ];

    /// The query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::SevenDays => "7days",
            Self::ThirtyDays => "30days",
            Self::OneYear => "1year",
            Self::ThisWeek => "this_week",
            Self::ThisMonth => "this_month",
        }
    }

    /// Label for the range picker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Hari ini",
            Self::SevenDays => "7 hari terakhir",
            Self::ThirtyDays => "30 hari terakhir",
            Self::OneYear => "1 tahun terakhir",
            Self::ThisWeek => "Minggu ini",
            Self::ThisMonth => "Bulan ini",
        }
    }

    /// Resolve this range to a window of whole calendar days ending around `today`.
    ///
    /// `this_month` runs to the last day of the month, so it may include days
    /// after `today`. Every other range ends on `today`.
    #[must_use]
    pub fn window(self, today: NaiveDate) -> DateWindow {
        let back = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN);
        let (first, last) = match self {
            Self::Today => (today, today),
            Self::SevenDays => (back(6), today),
            Self::ThirtyDays => (back(29), today),
            Self::OneYear => (back(364), today),
            Self::ThisWeek => (
                back(u64::from(today.weekday().num_days_from_monday())),
                today,
            ),
            Self::ThisMonth => {
                let first = today.with_day(1).unwrap_or(today);
                let last = first
                    .checked_add_months(chrono::Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(today);
                (first, last)
            }
        };
        DateWindow { first, last }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|range| range.as_str() == s)
            .ok_or_else(|| TimeRangeError(s.to_owned()))
    }
}

/// An inclusive span of calendar days in the business timezone.
///
/// Converted to instants as the half-open interval
/// `[first 00:00, (last + 1) 00:00)` so a record stamped exactly at midnight
/// belongs to the day that starts there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    first: NaiveDate,
    last: NaiveDate,
}

impl DateWindow {
    /// Build a window from its first and last day, swapping them if reversed.
    #[must_use]
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        if first <= last {
            Self { first, last }
        } else {
            Self {
                first: last,
                last: first,
            }
        }
    }

    /// A window covering a single day.
    #[must_use]
    pub const fn single_day(day: NaiveDate) -> Self {
        Self {
            first: day,
            last: day,
        }
    }

    #[must_use]
    pub const fn first(&self) -> NaiveDate {
        self.first
    }

    #[must_use]
    pub const fn last(&self) -> NaiveDate {
        self.last
    }

    /// Number of days in the window.
    #[must_use]
    pub fn len_days(&self) -> usize {
        usize::try_from((self.last - self.first).num_days() + 1).unwrap_or(0)
    }

    /// Iterate over every day in the window, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let last = self.last;
        self.first.iter_days().take_while(move |d| *d <= last)
    }

    /// Whether `day` falls inside the window.
    #[must_use]
    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.first <= day && day <= self.last
    }

    /// Start instant (inclusive) in UTC.
    #[must_use]
    pub fn start_utc(&self, offset: FixedOffset) -> DateTime<Utc> {
        midnight_utc(self.first, offset)
    }

    /// End instant (exclusive) in UTC.
    #[must_use]
    pub fn end_utc(&self, offset: FixedOffset) -> DateTime<Utc> {
        let next = self.last.succ_opt().unwrap_or(self.last);
        midnight_utc(next, offset)
    }

    /// Whether an instant falls inside `[start, end)`.
    #[must_use]
    pub fn contains_instant(&self, at: DateTime<Utc>, offset: FixedOffset) -> bool {
        at >= self.start_utc(offset) && at < self.end_utc(offset)
    }
}

/// The business-local calendar day an instant falls on.
#[must_use]
pub fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

fn midnight_utc(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = day.and_time(NaiveTime::MIN);
    // Fixed offsets have no gaps or folds
    offset
        .from_local_datetime(&local)
        .single()
        .map_or_else(|| local.and_utc(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    #[test]
    fn test_parse_all_ranges() {
        for range in TimeRange::ALL {
            assert_eq!(range.as_str().parse::<TimeRange>().unwrap(), range);
        }
        assert_eq!(
            "2weeks".parse::<TimeRange>(),
            Err(TimeRangeError("2weeks".to_owned()))
        );
    }

    #[test]
    fn test_seven_days_includes_today() {
        let window = TimeRange::SevenDays.window(date(2024, 3, 10));
        assert_eq!(window.first(), date(2024, 3, 4));
        assert_eq!(window.last(), date(2024, 3, 10));
        assert_eq!(window.len_days(), 7);
    }

    #[test]
    fn test_thirty_days_and_year() {
        let today = date(2024, 3, 10);
        assert_eq!(TimeRange::ThirtyDays.window(today).len_days(), 30);
        assert_eq!(TimeRange::OneYear.window(today).len_days(), 365);
        assert_eq!(TimeRange::Today.window(today).len_days(), 1);
    }

    #[test]
    fn test_this_week_starts_monday() {
        // 2024-03-10 is a Sunday
        let window = TimeRange::ThisWeek.window(date(2024, 3, 10));
        assert_eq!(window.first(), date(2024, 3, 4));
        assert_eq!(window.len_days(), 7);

        // Monday is a one-day week so far
        let window = TimeRange::ThisWeek.window(date(2024, 3, 4));
        assert_eq!(window.first(), date(2024, 3, 4));
        assert_eq!(window.len_days(), 1);
    }

    #[test]
    fn test_this_month_covers_whole_month() {
        let window = TimeRange::ThisMonth.window(date(2024, 2, 10));
        assert_eq!(window.first(), date(2024, 2, 1));
        assert_eq!(window.last(), date(2024, 2, 29));

        let window = TimeRange::ThisMonth.window(date(2023, 12, 31));
        assert_eq!(window.last(), date(2023, 12, 31));
    }

    #[test]
    fn test_window_instants_are_half_open_in_local_time() {
        let window = DateWindow::single_day(date(2024, 3, 10));
        // 2024-03-10 00:00 +07:00 == 2024-03-09 17:00 UTC
        let start = window.start_utc(wib());
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 9, 17, 0, 0).unwrap());

        let end = window.end_utc(wib());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 10, 17, 0, 0).unwrap());

        assert!(window.contains_instant(start, wib()));
        assert!(!window.contains_instant(end, wib()));
        assert!(window.contains_instant(end - chrono::Duration::seconds(1), wib()));
    }

    #[test]
    fn test_local_day_at_midnight_edge() {
        // 16:59:59 UTC is 23:59:59 local on the 10th; 17:00 is midnight on the 11th
        let before = Utc.with_ymd_and_hms(2024, 3, 10, 16, 59, 59).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 17, 0, 0).unwrap();
        assert_eq!(local_day(before, wib()), date(2024, 3, 10));
        assert_eq!(local_day(at, wib()), date(2024, 3, 11));
    }

    #[test]
    fn test_days_iterates_inclusive() {
        let window = DateWindow::new(date(2024, 2, 28), date(2024, 3, 1));
        let days: Vec<_> = window.days().collect();
        assert_eq!(days, vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]);
    }

    #[test]
    fn test_new_swaps_reversed_bounds() {
        let window = DateWindow::new(date(2024, 3, 5), date(2024, 3, 1));
        assert_eq!(window.first(), date(2024, 3, 1));
        assert!(window.contains_day(date(2024, 3, 3)));
    }
}
