//! Calendar periods a pricing run targets.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days of daily occupancy averaged before the target date.
pub const DAILY_WINDOW_DAYS: i64 = 7;

/// A calendar month. Orders chronologically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Whole months from `self` to `later` (negative when `later` is earlier).
    pub fn months_until(self, later: YearMonth) -> i64 {
        (later.year as i64 - self.year as i64) * 12 + (later.month as i64 - self.month as i64)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Target of a pricing run: the month whose expenses are priced and the
/// date whose preceding week supplies daily occupancy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPeriod {
    pub month: YearMonth,
    pub target_date: NaiveDate,
}

impl PricingPeriod {
    /// Month mode. The target date is the first day of the following month,
    /// so the daily window is the month's final week.
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let ym = YearMonth::new(year, month)?;
        let target_date = ym.next().first_day()?;
        Some(Self {
            month: ym,
            target_date,
        })
    }

    /// Date mode: prices the month containing `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            month: YearMonth::of(date),
            target_date: date,
        }
    }

    /// Half-open `[from, to)` range of daily occupancy dates to average.
    pub fn daily_window(&self) -> (NaiveDate, NaiveDate) {
        (
            self.target_date - Duration::days(DAILY_WINDOW_DAYS),
            self.target_date,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_validation() {
        assert!(YearMonth::new(2025, 0).is_none());
        assert!(YearMonth::new(2025, 13).is_none());
        assert_eq!(YearMonth::new(2025, 12).unwrap().next(), YearMonth::new(2026, 1).unwrap());
    }

    #[test]
    fn months_are_ordered_chronologically() {
        let a = YearMonth::new(2024, 12).unwrap();
        let b = YearMonth::new(2025, 1).unwrap();
        assert!(a < b);
        assert_eq!(a.months_until(b), 1);
        assert_eq!(b.months_until(a), -1);
        assert_eq!(a.to_string(), "2024-12");
    }

    #[test]
    fn month_mode_window_is_final_week() {
        let p = PricingPeriod::for_month(2025, 7).unwrap();
        assert_eq!(p.target_date, date(2025, 8, 1));
        assert_eq!(p.daily_window(), (date(2025, 7, 25), date(2025, 8, 1)));
    }

    #[test]
    fn date_mode_excludes_target_date() {
        let p = PricingPeriod::for_date(date(2025, 3, 3));
        assert_eq!(p.month, YearMonth::new(2025, 3).unwrap());
        assert_eq!(p.daily_window(), (date(2025, 2, 24), date(2025, 3, 3)));
    }
}
