//! Frequency rules and the due-date predicate.
//!
//! A habit is "due" on a date when its frequency rule asks for action that
//! day. The predicate is pure: it only looks at the rule and the date's
//! weekday. Calendar windows used by statistics (ISO week, calendar month,
//! trailing days) also live here so every caller agrees on their bounds.

use chrono::{Datelike, Days, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default `days_per_week` target for weekly habits.
pub const DEFAULT_DAYS_PER_WEEK: u8 = 3;

fn default_days_per_week() -> u8 {
    DEFAULT_DAYS_PER_WEEK
}

/// How often a habit should be done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrequencyRule {
    /// Due every day.
    Daily,
    /// "N times per week". Due every day; the target is informational.
    Weekly {
        #[serde(default = "default_days_per_week")]
        days_per_week: u8,
    },
    /// Due only on the listed weekdays (0=Sun ... 6=Sat).
    Custom {
        #[serde(default)]
        specific_days: Vec<u8>,
    },
}

impl Default for FrequencyRule {
    fn default() -> Self {
        FrequencyRule::Daily
    }
}

impl FrequencyRule {
    /// Whether a habit with this rule is due on `date`.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        match self {
            FrequencyRule::Daily => true,
            FrequencyRule::Weekly { .. } => true,
            FrequencyRule::Custom { specific_days } => {
                let weekday = weekday_index(date);
                specific_days.contains(&weekday)
            }
        }
    }

    /// Check the rule and return it in canonical form.
    ///
    /// Custom weekdays are sorted and deduplicated.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        match self {
            FrequencyRule::Daily => Ok(FrequencyRule::Daily),
            FrequencyRule::Weekly { days_per_week } => {
                if !(1..=7).contains(&days_per_week) {
                    return Err(ValidationError::InvalidValue {
                        field: "days_per_week".into(),
                        message: format!("{days_per_week} is not between 1 and 7"),
                    });
                }
                Ok(FrequencyRule::Weekly { days_per_week })
            }
            FrequencyRule::Custom { mut specific_days } => {
                if let Some(bad) = specific_days.iter().find(|d| **d > 6) {
                    return Err(ValidationError::InvalidWeekday(*bad));
                }
                specific_days.sort_unstable();
                specific_days.dedup();
                Ok(FrequencyRule::Custom { specific_days })
            }
        }
    }

    /// Weekly target, if this is a weekly rule.
    pub fn weekly_target(&self) -> Option<u8> {
        match self {
            FrequencyRule::Weekly { days_per_week } => Some(*days_per_week),
            _ => None,
        }
    }
}

/// Free-function form of [`FrequencyRule::is_due`].
pub fn is_due(frequency: &FrequencyRule, date: NaiveDate) -> bool {
    frequency.is_due(date)
}

/// Weekday number with 0=Sunday ... 6=Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The single day `date`.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// ISO week (Monday through Sunday) containing `date`.
    pub fn iso_week(date: NaiveDate) -> Self {
        let week = date.week(Weekday::Mon);
        Self::new(week.first_day(), week.last_day())
    }

    /// Calendar month containing `date`.
    pub fn month(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self::new(start, end)
    }

    /// The `days` days ending on `date` (inclusive). Zero days yields an
    /// empty window.
    pub fn trailing(date: NaiveDate, days: u32) -> Self {
        if days == 0 {
            return Self::new(date, date.pred_opt().unwrap_or(date));
        }
        let start = date
            .checked_sub_days(Days::new(u64::from(days) - 1))
            .unwrap_or(NaiveDate::MIN);
        Self::new(start, date)
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Days of the window, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Number of days in the window.
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `date` shifted back by `days` days, clamped at the earliest representable date.
pub fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_is_always_due() {
        let rule = FrequencyRule::Daily;
        for d in date(2024, 1, 1).iter_days().take(14) {
            assert!(rule.is_due(d));
        }
    }

    #[test]
    fn weekly_is_not_restricted_by_weekday() {
        let rule = FrequencyRule::Weekly { days_per_week: 2 };
        for d in date(2024, 1, 1).iter_days().take(7) {
            assert!(rule.is_due(d));
        }
    }

    #[test]
    fn custom_matches_listed_weekdays() {
        // Mon / Wed / Fri
        let rule = FrequencyRule::Custom {
            specific_days: vec![1, 3, 5],
        };
        // 2024-01-01 is a Monday
        assert!(rule.is_due(date(2024, 1, 1)));
        assert!(!rule.is_due(date(2024, 1, 2)));
        assert!(rule.is_due(date(2024, 1, 3)));
        assert!(!rule.is_due(date(2024, 1, 6)));
        assert!(!rule.is_due(date(2024, 1, 7)));
    }

    #[test]
    fn custom_without_days_is_never_due() {
        let rule = FrequencyRule::Custom {
            specific_days: vec![],
        };
        for d in date(2024, 1, 1).iter_days().take(7) {
            assert!(!rule.is_due(d));
        }
    }

    #[test]
    fn sunday_is_zero() {
        assert_eq!(weekday_index(date(2024, 1, 7)), 0);
        assert_eq!(weekday_index(date(2024, 1, 6)), 6);
    }

    #[test]
    fn normalized_sorts_and_dedups_custom_days() {
        let rule = FrequencyRule::Custom {
            specific_days: vec![5, 1, 5, 3],
        }
        .normalized()
        .unwrap();
        assert_eq!(
            rule,
            FrequencyRule::Custom {
                specific_days: vec![1, 3, 5]
            }
        );
    }

    #[test]
    fn normalized_rejects_bad_values() {
        assert_eq!(
            FrequencyRule::Custom {
                specific_days: vec![1, 7]
            }
            .normalized(),
            Err(ValidationError::InvalidWeekday(7))
        );
        assert!(FrequencyRule::Weekly { days_per_week: 0 }.normalized().is_err());
        assert!(FrequencyRule::Weekly { days_per_week: 8 }.normalized().is_err());
    }

    #[test]
    fn frequency_serializes_with_type_tag() {
        let json = serde_json::to_value(FrequencyRule::Custom {
            specific_days: vec![1, 2],
        })
        .unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["specific_days"], serde_json::json!([1, 2]));

        let weekly: FrequencyRule = serde_json::from_str(r#"{"type":"weekly"}"#).unwrap();
        assert_eq!(
            weekly,
            FrequencyRule::Weekly {
                days_per_week: DEFAULT_DAYS_PER_WEEK
            }
        );
    }

    #[test]
    fn iso_week_starts_monday() {
        // Thursday 2024-01-04
        let week = DateWindow::iso_week(date(2024, 1, 4));
        assert_eq!(week.start, date(2024, 1, 1));
        assert_eq!(week.end, date(2024, 1, 7));
        assert_eq!(week.len(), 7);

        // Sunday belongs to the week that started the previous Monday
        let week = DateWindow::iso_week(date(2024, 1, 7));
        assert_eq!(week.start, date(2024, 1, 1));
    }

    #[test]
    fn month_window_handles_leap_february() {
        let month = DateWindow::month(date(2024, 2, 15));
        assert_eq!(month.start, date(2024, 2, 1));
        assert_eq!(month.end, date(2024, 2, 29));
        assert_eq!(month.days().count(), 29);

        let december = DateWindow::month(date(2023, 12, 31));
        assert_eq!(december.end, date(2023, 12, 31));
    }

    #[test]
    fn trailing_window_includes_today() {
        let window = DateWindow::trailing(date(2024, 3, 30), 30);
        assert_eq!(window.start, date(2024, 3, 1));
        assert_eq!(window.end, date(2024, 3, 30));
        assert_eq!(window.len(), 30);
        assert!(DateWindow::trailing(date(2024, 3, 30), 0).is_empty());
    }
}
