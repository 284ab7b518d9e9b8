//! Persistence contract shared by the SQLite and in-memory stores.

use crate::checkin::CheckIn;
use crate::error::Result;
use crate::habit::Habit;
use crate::settings::Settings;

/// Key-indexed record store for habits, check-ins and settings.
///
/// There are no transactions across entity types: cascades are sequenced
/// by the caller. Implementations must enforce at most one check-in per
/// `(habit_id, date)`.
pub trait Store {
    /// Insert a new habit.
    fn insert_habit(&mut self, habit: &Habit) -> Result<()>;

    /// Replace the stored fields of an existing habit, matched by id.
    fn update_habit(&mut self, habit: &Habit) -> Result<()>;

    /// Set `archived = true`. Returns `false` if no such habit is stored.
    fn archive_habit(&mut self, id: &str) -> Result<bool>;

    fn get_habit(&self, id: &str) -> Result<Option<Habit>>;

    /// All habits, or only those whose archived flag equals `archived`.
    fn list_habits(&self, archived: Option<bool>) -> Result<Vec<Habit>>;

    fn insert_check_in(&mut self, check_in: &CheckIn) -> Result<()>;

    /// Delete one check-in by id. Deleting an unknown id is not an error.
    fn delete_check_in(&mut self, id: &str) -> Result<()>;

    fn list_check_ins(&self) -> Result<Vec<CheckIn>>;

    fn check_ins_for_habit(&self, habit_id: &str) -> Result<Vec<CheckIn>>;

    /// Delete every check-in of a habit, returning how many were removed.
    fn delete_check_ins_for_habit(&mut self, habit_id: &str) -> Result<usize>;

    fn get_settings(&self) -> Result<Option<Settings>>;

    /// Insert or replace the settings singleton.
    fn put_settings(&mut self, settings: &Settings) -> Result<()>;
}
