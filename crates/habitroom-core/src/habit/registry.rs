//! In-memory registry of active habits.
//!
//! # Invariants
//! - Holds only non-archived habits, ordered by creation time.
//! - Every mutation is persisted through the [`Store`] first; the list is
//!   only touched after the store confirms the write.

use chrono::{DateTime, Utc};

use super::{Habit, HabitPatch, NewHabit};
use crate::error::{CoreError, Result};
use crate::storage::Store;

#[derive(Debug, Default, Clone)]
pub struct HabitRegistry {
    habits: Vec<Habit>,
}

impl HabitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from habits; archived ones are dropped.
    pub fn from_habits<I: IntoIterator<Item = Habit>>(habits: I) -> Self {
        let mut habits: Vec<Habit> = habits.into_iter().filter(|h| !h.archived).collect();
        habits.sort_by_key(|h| h.created_at);
        Self { habits }
    }

    /// Replace the list with the store's non-archived habits.
    pub fn load<S: Store + ?Sized>(&mut self, store: &S) -> Result<()> {
        let habits = store.list_habits(Some(false))?;
        *self = Self::from_habits(habits);
        tracing::debug!(count = self.habits.len(), "loaded habits");
        Ok(())
    }

    /// Create, persist and append a habit.
    pub fn create<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        fields: NewHabit,
        now: DateTime<Utc>,
    ) -> Result<Habit> {
        let habit = Habit::new(fields, now)?;
        store.insert_habit(&habit)?;
        self.habits.push(habit.clone());
        tracing::info!(habit_id = %habit.id, name = %habit.name, "habit created");
        Ok(habit)
    }

    /// Merge `patch` into an active habit, persist, and replace it in place.
    ///
    /// Fails with [`CoreError::HabitNotFound`] if `id` is not active.
    pub fn update<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
        patch: HabitPatch,
        now: DateTime<Utc>,
    ) -> Result<Habit> {
        let position = self.position(id)?;
        let updated = self.habits[position].merged(patch, now)?;
        store.update_habit(&updated)?;
        self.habits[position] = updated.clone();
        tracing::info!(habit_id = id, "habit updated");
        Ok(updated)
    }

    /// Archive a habit in the store and drop it from the list.
    ///
    /// Check-ins are not touched here; see [`crate::Tracker::delete_habit`]
    /// for the cascading variant.
    pub fn archive<S: Store + ?Sized>(&mut self, store: &mut S, id: &str) -> Result<Habit> {
        let position = self.position(id)?;
        if !store.archive_habit(id)? {
            return Err(CoreError::HabitNotFound(id.to_string()));
        }
        let mut habit = self.habits.remove(position);
        habit.archived = true;
        tracing::info!(habit_id = id, "habit archived");
        Ok(habit)
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Active habits in creation order.
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Active habits carrying `tag`.
    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Habit> + 'a {
        self.habits.iter().filter(move |h| h.tags.iter().any(|t| t == tag))
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| CoreError::HabitNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::FrequencyRule;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn create_appends_in_creation_order() {
        let mut store = MemoryStore::new();
        let mut registry = HabitRegistry::new();
        let a = registry.create(&mut store, NewHabit::named("A"), t0()).unwrap();
        let b = registry
            .create(&mut store, NewHabit::named("B"), t0() + Duration::minutes(1))
            .unwrap();
        let ids: Vec<_> = registry.habits().iter().map(|h| h.id.clone()).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert_eq!(store.list_habits(None).unwrap().len(), 2);
    }

    #[test]
    fn load_orders_by_created_at_and_skips_archived() {
        let mut store = MemoryStore::new();
        let late = Habit::new(NewHabit::named("late"), t0() + Duration::days(1)).unwrap();
        let early = Habit::new(NewHabit::named("early"), t0()).unwrap();
        let mut gone = Habit::new(NewHabit::named("gone"), t0()).unwrap();
        gone.archived = true;
        store.insert_habit(&late).unwrap();
        store.insert_habit(&early).unwrap();
        store.insert_habit(&gone).unwrap();

        let mut registry = HabitRegistry::new();
        registry.load(&store).unwrap();
        let names: Vec<_> = registry.habits().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["early", "late"]);
    }

    #[test]
    fn update_keeps_position() {
        let mut store = MemoryStore::new();
        let mut registry = HabitRegistry::new();
        let a = registry.create(&mut store, NewHabit::named("A"), t0()).unwrap();
        registry.create(&mut store, NewHabit::named("B"), t0()).unwrap();

        let patch = HabitPatch {
            name: Some("A2".into()),
            frequency: Some(FrequencyRule::Weekly { days_per_week: 4 }),
            ..HabitPatch::default()
        };
        let updated = registry
            .update(&mut store, &a.id, patch, t0() + Duration::hours(2))
            .unwrap();
        assert_eq!(registry.habits()[0].name, "A2");
        assert_eq!(updated.updated_at, t0() + Duration::hours(2));
        assert_eq!(store.get_habit(&a.id).unwrap().unwrap().name, "A2");
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut store = MemoryStore::new();
        let mut registry = HabitRegistry::new();
        let err = registry
            .update(&mut store, "nope", HabitPatch::default(), t0())
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(registry.archive(&mut store, "nope").unwrap_err().is_not_found());
    }

    #[test]
    fn archive_removes_from_list_and_flags_store() {
        let mut store = MemoryStore::new();
        let mut registry = HabitRegistry::new();
        let a = registry.create(&mut store, NewHabit::named("A"), t0()).unwrap();
        let archived = registry.archive(&mut store, &a.id).unwrap();
        assert!(archived.archived);
        assert!(registry.is_empty());
        assert!(store.get_habit(&a.id).unwrap().unwrap().archived);
    }

    #[test]
    fn with_tag_filters() {
        let mut store = MemoryStore::new();
        let mut registry = HabitRegistry::new();
        registry
            .create(&mut store, NewHabit::named("A").with_tags(["health"]), t0())
            .unwrap();
        registry.create(&mut store, NewHabit::named("B"), t0()).unwrap();
        assert_eq!(registry.with_tag("health").count(), 1);
    }
}
