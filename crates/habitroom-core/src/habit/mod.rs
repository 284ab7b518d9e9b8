//! Habit definitions.
//!
//! A [`Habit`] is a recurring activity with a [`FrequencyRule`]. Habits are
//! never hard-deleted: deleting one archives it and drops its check-ins.

mod registry;

pub use registry::HabitRegistry;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::schedule::FrequencyRule;

pub const DEFAULT_ICON: &str = "📖";
pub const DEFAULT_COLOR: &str = "#22c55e";

/// A habit definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub icon: String,
    pub color: String,
    pub frequency: FrequencyRule,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Reminder time of day as `HH:MM`, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
}

impl Habit {
    /// Build a new, unarchived habit from a creation request.
    pub fn new(fields: NewHabit, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let fields = fields.validated()?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            description: fields.description,
            icon: fields.icon,
            color: fields.color,
            frequency: fields.frequency,
            tags: fields.tags,
            reminder_time: fields.reminder_time,
            created_at: now,
            updated_at: now,
            archived: false,
        })
    }

    /// Local calendar date on which the habit was created.
    ///
    /// Dates before this one are never due for the habit.
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.with_timezone(&Local).date_naive()
    }

    /// Whether the habit is due on `date`: the date is not before creation
    /// and the frequency rule asks for it.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due_dates().is_due(date)
    }

    /// Due-date view with the creation date resolved once, for loops that
    /// ask about many dates.
    pub fn due_dates(&self) -> DueDates<'_> {
        DueDates {
            created_on: self.created_on(),
            frequency: &self.frequency,
        }
    }

    /// Copy of this habit with `patch` merged in. `updated_at` is bumped to
    /// `now`; identity and creation time never change.
    pub fn merged(&self, patch: HabitPatch, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = clean_name(&name)?;
        }
        if let Some(description) = patch.description {
            next.description = clean_optional(description);
        }
        if let Some(icon) = patch.icon {
            next.icon = icon;
        }
        if let Some(color) = patch.color {
            next.color = color;
        }
        if let Some(frequency) = patch.frequency {
            next.frequency = frequency.normalized()?;
        }
        if let Some(tags) = patch.tags {
            next.tags = clean_tags(tags);
        }
        if let Some(reminder_time) = patch.reminder_time {
            next.reminder_time = clean_optional(reminder_time);
        }
        next.updated_at = now;
        Ok(next)
    }
}

/// A habit's frequency rule paired with its local creation date.
#[derive(Debug, Clone, Copy)]
pub struct DueDates<'a> {
    created_on: NaiveDate,
    frequency: &'a FrequencyRule,
}

impl DueDates<'_> {
    pub fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    pub fn is_due(&self, date: NaiveDate) -> bool {
        date >= self.created_on && self.frequency.is_due(date)
    }
}

/// Fields supplied when creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub frequency: FrequencyRule,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reminder_time: Option<String>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl NewHabit {
    /// Daily habit with default presentation.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            icon: default_icon(),
            color: default_color(),
            frequency: FrequencyRule::Daily,
            tags: Vec::new(),
            reminder_time: None,
        }
    }

    pub fn with_frequency(mut self, frequency: FrequencyRule) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: clean_name(&self.name)?,
            description: self.description.and_then(clean_optional),
            icon: self.icon,
            color: self.color,
            frequency: self.frequency.normalized()?,
            tags: clean_tags(self.tags),
            reminder_time: self.reminder_time.and_then(clean_optional),
        })
    }
}

/// Partial update for a habit. `None` leaves a field as it is; for the
/// optional text fields an empty string clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub frequency: Option<FrequencyRule>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub reminder_time: Option<String>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        *self == HabitPatch::default()
    }
}

fn clean_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("name"));
    }
    Ok(trimmed.to_string())
}

fn clean_optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_habit_trims_and_defaults() {
        let habit = Habit::new(
            NewHabit::named("  Read  ").with_tags(["learning", " learning ", ""]),
            now(),
        )
        .unwrap();
        assert_eq!(habit.name, "Read");
        assert_eq!(habit.tags, vec!["learning".to_string()]);
        assert_eq!(habit.created_at, habit.updated_at);
        assert!(!habit.archived);
        assert_eq!(habit.icon, DEFAULT_ICON);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Habit::new(NewHabit::named("   "), now()).unwrap_err();
        assert_eq!(err, ValidationError::Empty("name"));
    }

    #[test]
    fn merge_replaces_given_fields_and_bumps_timestamp() {
        let habit = Habit::new(NewHabit::named("Run"), now()).unwrap();
        let later = now() + Duration::hours(1);
        let patch = HabitPatch {
            name: Some("Run 5k".into()),
            description: Some("".into()),
            frequency: Some(FrequencyRule::Custom {
                specific_days: vec![6, 0],
            }),
            ..HabitPatch::default()
        };
        let merged = habit.merged(patch, later).unwrap();
        assert_eq!(merged.id, habit.id);
        assert_eq!(merged.name, "Run 5k");
        assert_eq!(merged.description, None);
        assert_eq!(
            merged.frequency,
            FrequencyRule::Custom {
                specific_days: vec![0, 6]
            }
        );
        assert_eq!(merged.created_at, habit.created_at);
        assert_eq!(merged.updated_at, later);
    }

    #[test]
    fn merge_validates_before_applying() {
        let habit = Habit::new(NewHabit::named("Run"), now()).unwrap();
        let patch = HabitPatch {
            name: Some(" ".into()),
            ..HabitPatch::default()
        };
        assert!(habit.merged(patch, now()).is_err());
    }

    #[test]
    fn dates_before_creation_are_not_due() {
        let habit = Habit::new(NewHabit::named("Stretch"), now()).unwrap();
        let created = habit.created_on();
        assert!(habit.is_due_on(created));
        assert!(!habit.is_due_on(created.pred_opt().unwrap()));
    }

    #[test]
    fn due_dates_agree_with_is_due_on() {
        let habit = Habit::new(
            NewHabit::named("Gym").with_frequency(FrequencyRule::Custom {
                specific_days: vec![1, 3, 5],
            }),
            now(),
        )
        .unwrap();
        let due = habit.due_dates();
        assert_eq!(due.created_on(), habit.created_on());
        let start = habit.created_on() - Duration::days(10);
        for date in start.iter_days().take(30) {
            assert_eq!(due.is_due(date), habit.is_due_on(date), "{date}");
        }
    }

    #[test]
    fn timestamps_serialize_as_epoch_millis() {
        let habit = Habit::new(NewHabit::named("Water"), now()).unwrap();
        let json = serde_json::to_value(&habit).unwrap();
        assert_eq!(json["created_at"], now().timestamp_millis());
        let back: Habit = serde_json::from_value(json).unwrap();
        assert_eq!(back, habit);
    }
}
