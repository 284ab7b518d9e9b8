//! In-memory [`Store`] for ephemeral sessions and tests.

use std::collections::BTreeMap;

use crate::checkin::CheckIn;
use crate::error::{DatabaseError, Result};
use crate::habit::Habit;
use crate::settings::Settings;

use super::Store;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    habits: BTreeMap<String, Habit>,
    check_ins: BTreeMap<String, CheckIn>,
    settings: Option<Settings>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn insert_habit(&mut self, habit: &Habit) -> Result<()> {
        if self.habits.contains_key(&habit.id) {
            return Err(DatabaseError::QueryFailed(format!("duplicate habit id {}", habit.id)).into());
        }
        self.habits.insert(habit.id.clone(), habit.clone());
        Ok(())
    }

    fn update_habit(&mut self, habit: &Habit) -> Result<()> {
        if let Some(slot) = self.habits.get_mut(&habit.id) {
            *slot = habit.clone();
        }
        Ok(())
    }

    fn archive_habit(&mut self, id: &str) -> Result<bool> {
        Ok(match self.habits.get_mut(id) {
            Some(habit) => {
                habit.archived = true;
                true
            }
            None => false,
        })
    }

    fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        Ok(self.habits.get(id).cloned())
    }

    fn list_habits(&self, archived: Option<bool>) -> Result<Vec<Habit>> {
        let mut habits: Vec<Habit> = self
            .habits
            .values()
            .filter(|h| archived.map_or(true, |a| h.archived == a))
            .cloned()
            .collect();
        habits.sort_by_key(|h| h.created_at);
        Ok(habits)
    }

    fn insert_check_in(&mut self, check_in: &CheckIn) -> Result<()> {
        let clash = self
            .check_ins
            .values()
            .any(|c| c.habit_id == check_in.habit_id && c.date == check_in.date);
        if clash || self.check_ins.contains_key(&check_in.id) {
            return Err(DatabaseError::QueryFailed(format!(
                "check-in already exists for {} on {}",
                check_in.habit_id, check_in.date
            ))
            .into());
        }
        self.check_ins.insert(check_in.id.clone(), check_in.clone());
        Ok(())
    }

    fn delete_check_in(&mut self, id: &str) -> Result<()> {
        self.check_ins.remove(id);
        Ok(())
    }

    fn list_check_ins(&self) -> Result<Vec<CheckIn>> {
        Ok(self.check_ins.values().cloned().collect())
    }

    fn check_ins_for_habit(&self, habit_id: &str) -> Result<Vec<CheckIn>> {
        Ok(self
            .check_ins
            .values()
            .filter(|c| c.habit_id == habit_id)
            .cloned()
            .collect())
    }

    fn delete_check_ins_for_habit(&mut self, habit_id: &str) -> Result<usize> {
        let before = self.check_ins.len();
        self.check_ins.retain(|_, c| c.habit_id != habit_id);
        Ok(before - self.check_ins.len())
    }

    fn get_settings(&self) -> Result<Option<Settings>> {
        Ok(self.settings.clone())
    }

    fn put_settings(&mut self, settings: &Settings) -> Result<()> {
        self.settings = Some(settings.clone());
        Ok(())
    }
}
