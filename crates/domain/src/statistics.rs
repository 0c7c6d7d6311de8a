use chrono::{Days, NaiveDate};

/// Closed interval of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl Interval {
    /// The trailing `days` days up to and including `today`.
    ///
    /// A window of zero days contains only `today`.
    #[must_use]
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        Interval {
            first: today
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
            last: today,
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }
}

impl From<std::ops::RangeInclusive<NaiveDate>> for Interval {
    fn from(value: std::ops::RangeInclusive<NaiveDate>) -> Self {
        Interval {
            first: *value.start(),
            last: *value.end(),
        }
    }
}

/// Trailing windows offered for progress charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultInterval {
    _1Y = 365,
    _6M = 182,
    _3M = 91,
    _1M = 30,
    _1W = 7,
}

impl DefaultInterval {
    #[must_use]
    pub fn days(self) -> u32 {
        self as u32
    }
}

/// Running maximum of a series of (date, value) pairs.
///
/// The series must be sorted by date. Each point holds the highest value observed up to and
/// including its date.
#[must_use]
pub fn running_max(series: &[(NaiveDate, f32)]) -> Vec<(NaiveDate, f32)> {
    series
        .iter()
        .scan(f32::MIN, |max, (date, value)| {
            *max = max.max(*value);
            Some((*date, *max))
        })
        .collect()
}
