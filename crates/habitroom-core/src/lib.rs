//! # Habitroom Core Library
//!
//! This library provides the core business logic for the Habitroom habit
//! tracker. Every operation is available through the standalone CLI binary,
//! which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Schedule**: frequency rules and the "is this habit due on this date"
//!   predicate, plus calendar windows (day, ISO week, month, trailing)
//! - **Habits / Check-ins**: in-memory mirrors of persisted state, written
//!   through a [`Store`] before they change
//! - **Streaks / Stats**: pure derived views over the mirrors
//! - **Storage**: SQLite persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Tracker`]: application state and the single write path
//! - [`StreakCalculator`]: current and best streaks
//! - [`StatsAnalyzer`]: completion rates for a period
//! - [`Database`]: SQLite-backed [`Store`]
//! - [`Config`]: application configuration management

pub mod checkin;
pub mod error;
pub mod habit;
pub mod schedule;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use checkin::{CheckIn, CheckInIndex};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{DueDates, Habit, HabitPatch, HabitRegistry, NewHabit};
pub use schedule::{is_due, DateWindow, FrequencyRule};
pub use settings::{Settings, ThemeMode};
pub use stats::{
    CalendarDay, DayStatus, DayTally, Period, PeriodStats, StatsAnalyzer, TodayProgress,
    WeeklyTarget,
};
pub use storage::{Config, Database, MemoryStore, Store};
pub use streak::{Streak, StreakCalculator};
pub use tracker::Tracker;
