//! Check-ins and the in-memory check-in index.
//!
//! A [`CheckIn`] records that a habit was done on a calendar date. Absence
//! of a record means "not done". The [`CheckInIndex`] mirrors the persisted
//! check-ins keyed by `(habit_id, date)` so lookups during streak and
//! statistics computation are synchronous. Every mutation is written to the
//! store first and mirrored only after the write succeeds.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::storage::Store;

/// A completion record for one habit on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub habit_id: String,
    pub date: NaiveDate,
    /// Always true for a stored record.
    pub completed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl CheckIn {
    pub fn new(habit_id: impl Into<String>, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            habit_id: habit_id.into(),
            date,
            completed: true,
            timestamp: now,
        }
    }

    fn key(&self) -> (String, NaiveDate) {
        (self.habit_id.clone(), self.date)
    }
}

/// In-memory mirror of persisted check-ins, at most one per `(habit, date)`.
#[derive(Debug, Default, Clone)]
pub struct CheckInIndex {
    entries: HashMap<(String, NaiveDate), CheckIn>,
}

impl CheckInIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from records, e.g. in tests or after a bulk import.
    /// Later records win when two share a key.
    pub fn from_check_ins<I: IntoIterator<Item = CheckIn>>(check_ins: I) -> Self {
        let entries = check_ins.into_iter().map(|c| (c.key(), c)).collect();
        Self { entries }
    }

    /// Replace the mirror with everything the store holds.
    ///
    /// On error the previous contents are kept.
    pub fn load<S: Store + ?Sized>(&mut self, store: &S) -> Result<()> {
        let all = store.list_check_ins()?;
        *self = Self::from_check_ins(all);
        tracing::debug!(count = self.entries.len(), "loaded check-ins");
        Ok(())
    }

    /// Flip completion for `habit_id` on `date`.
    ///
    /// Returns `true` if the habit is now done on that date, `false` if the
    /// existing record was removed.
    pub fn toggle<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        habit_id: &str,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let key = (habit_id.to_string(), date);
        if let Some(existing) = self.entries.get(&key) {
            store.delete_check_in(&existing.id)?;
            self.entries.remove(&key);
            tracing::info!(habit_id, %date, "check-in removed");
            return Ok(false);
        }

        let check_in = CheckIn::new(habit_id, date, now);
        store.insert_check_in(&check_in)?;
        self.entries.insert(key, check_in);
        tracing::info!(habit_id, %date, "check-in recorded");
        Ok(true)
    }

    /// Delete every check-in of a habit from the store, then from the mirror.
    pub fn remove_habit<S: Store + ?Sized>(&mut self, store: &mut S, habit_id: &str) -> Result<usize> {
        let deleted = store.delete_check_ins_for_habit(habit_id)?;
        self.entries.retain(|(id, _), _| id != habit_id);
        Ok(deleted)
    }

    pub fn get(&self, habit_id: &str, date: NaiveDate) -> Option<&CheckIn> {
        self.entries.get(&(habit_id.to_string(), date))
    }

    pub fn is_done(&self, habit_id: &str, date: NaiveDate) -> bool {
        self.get(habit_id, date).is_some()
    }

    /// All check-ins of one habit, in no particular order.
    pub fn all_for_habit<'a>(&'a self, habit_id: &'a str) -> impl Iterator<Item = &'a CheckIn> + 'a {
        self.entries.values().filter(move |c| c.habit_id == habit_id)
    }

    /// All check-ins on one date, in no particular order.
    pub fn all_for_date(&self, date: NaiveDate) -> impl Iterator<Item = &CheckIn> + '_ {
        self.entries.values().filter(move |c| c.date == date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckIn> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn toggle_on_then_off() {
        let mut store = MemoryStore::new();
        let mut index = CheckInIndex::new();
        let now = Utc::now();

        assert!(index.toggle(&mut store, "h1", date(3), now).unwrap());
        assert!(index.is_done("h1", date(3)));
        assert_eq!(store.list_check_ins().unwrap().len(), 1);

        assert!(!index.toggle(&mut store, "h1", date(3), now).unwrap());
        assert!(index.get("h1", date(3)).is_none());
        assert!(store.list_check_ins().unwrap().is_empty());
    }

    #[test]
    fn lookups_by_habit_and_date() {
        let mut store = MemoryStore::new();
        let mut index = CheckInIndex::new();
        let now = Utc::now();
        index.toggle(&mut store, "h1", date(1), now).unwrap();
        index.toggle(&mut store, "h1", date(2), now).unwrap();
        index.toggle(&mut store, "h2", date(2), now).unwrap();

        assert_eq!(index.all_for_habit("h1").count(), 2);
        assert_eq!(index.all_for_date(date(2)).count(), 2);
        assert_eq!(index.all_for_date(date(3)).count(), 0);
    }

    #[test]
    fn load_mirrors_store() {
        let mut store = MemoryStore::new();
        store
            .insert_check_in(&CheckIn::new("h1", date(5), Utc::now()))
            .unwrap();
        let mut index = CheckInIndex::new();
        index.load(&store).unwrap();
        assert!(index.is_done("h1", date(5)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn remove_habit_clears_store_and_mirror() {
        let mut store = MemoryStore::new();
        let mut index = CheckInIndex::new();
        let now = Utc::now();
        index.toggle(&mut store, "h1", date(1), now).unwrap();
        index.toggle(&mut store, "h1", date(2), now).unwrap();
        index.toggle(&mut store, "h2", date(2), now).unwrap();

        assert_eq!(index.remove_habit(&mut store, "h1").unwrap(), 2);
        assert_eq!(index.all_for_habit("h1").count(), 0);
        assert_eq!(index.len(), 1);
        assert_eq!(store.check_ins_for_habit("h1").unwrap().len(), 0);
    }
}
