//! SQLite-based storage for habits, check-ins and settings.
//!
//! Timestamps are stored as epoch milliseconds, dates as `YYYY-MM-DD`,
//! frequency rules and tag lists as JSON text.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{migrations, Store};
use crate::checkin::CheckIn;
use crate::error::{CoreError, DatabaseError, Result};
use crate::habit::Habit;
use crate::schedule::FrequencyRule;
use crate::settings::{Settings, ThemeMode, SETTINGS_ID};

const HABIT_COLUMNS: &str = "id, name, description, icon, color, frequency, tags, reminder_time, \
                             created_at, updated_at, archived";
const CHECK_IN_COLUMNS: &str = "id, habit_id, date, completed, timestamp";

fn from_millis(table: &'static str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        DatabaseError::CorruptRow {
            table,
            message: format!("timestamp {millis} out of range"),
        }
        .into()
    })
}

/// Raw habit row; JSON and timestamp columns are decoded afterwards so
/// decode failures surface as [`DatabaseError::CorruptRow`].
struct HabitRow {
    id: String,
    name: String,
    description: Option<String>,
    icon: String,
    color: String,
    frequency: String,
    tags: String,
    reminder_time: Option<String>,
    created_at: i64,
    updated_at: i64,
    archived: bool,
}

impl HabitRow {
    fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
            color: row.get(4)?,
            frequency: row.get(5)?,
            tags: row.get(6)?,
            reminder_time: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            archived: row.get(10)?,
        })
    }

    fn decode(self) -> Result<Habit> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            table: "habits",
            message,
        };
        let frequency: FrequencyRule = serde_json::from_str(&self.frequency)
            .map_err(|e| corrupt(format!("frequency of {}: {e}", self.id)))?;
        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .map_err(|e| corrupt(format!("tags of {}: {e}", self.id)))?;
        Ok(Habit {
            created_at: from_millis("habits", self.created_at)?,
            updated_at: from_millis("habits", self.updated_at)?,
            id: self.id,
            name: self.name,
            description: self.description,
            icon: self.icon,
            color: self.color,
            frequency,
            tags,
            reminder_time: self.reminder_time,
            archived: self.archived,
        })
    }
}

struct CheckInRow {
    id: String,
    habit_id: String,
    date: String,
    completed: bool,
    timestamp: i64,
}

impl CheckInRow {
    fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            date: row.get(2)?,
            completed: row.get(3)?,
            timestamp: row.get(4)?,
        })
    }

    fn decode(self) -> Result<CheckIn> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|e| {
            DatabaseError::CorruptRow {
                table: "check_ins",
                message: format!("date '{}' of {}: {e}", self.date, self.id),
            }
        })?;
        Ok(CheckIn {
            timestamp: from_millis("check_ins", self.timestamp)?,
            id: self.id,
            habit_id: self.habit_id,
            date,
            completed: self.completed,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// SQLite database for habit storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Open an in-memory database (for tests and throwaway sessions).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    fn query_habits(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, HabitRow::read)?;
        let mut habits = Vec::new();
        for row in rows {
            habits.push(row?.decode()?);
        }
        Ok(habits)
    }

    fn query_check_ins(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<CheckIn>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, CheckInRow::read)?;
        let mut check_ins = Vec::new();
        for row in rows {
            check_ins.push(row?.decode()?);
        }
        Ok(check_ins)
    }
}

impl Store for Database {
    fn insert_habit(&mut self, habit: &Habit) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO habits ({HABIT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.icon,
                habit.color,
                serde_json::to_string(&habit.frequency)?,
                serde_json::to_string(&habit.tags)?,
                habit.reminder_time,
                habit.created_at.timestamp_millis(),
                habit.updated_at.timestamp_millis(),
                habit.archived,
            ],
        )?;
        Ok(())
    }

    fn update_habit(&mut self, habit: &Habit) -> Result<()> {
        self.conn.execute(
            "UPDATE habits
             SET name = ?2, description = ?3, icon = ?4, color = ?5, frequency = ?6,
                 tags = ?7, reminder_time = ?8, updated_at = ?9, archived = ?10
             WHERE id = ?1",
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.icon,
                habit.color,
                serde_json::to_string(&habit.frequency)?,
                serde_json::to_string(&habit.tags)?,
                habit.reminder_time,
                habit.updated_at.timestamp_millis(),
                habit.archived,
            ],
        )?;
        Ok(())
    }

    fn archive_habit(&mut self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("UPDATE habits SET archived = 1 WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                params![id],
                HabitRow::read,
            )
            .optional()?;
        row.map(HabitRow::decode).transpose()
    }

    fn list_habits(&self, archived: Option<bool>) -> Result<Vec<Habit>> {
        match archived {
            Some(archived) => self.query_habits(
                &format!(
                    "SELECT {HABIT_COLUMNS} FROM habits WHERE archived = ?1 ORDER BY created_at ASC"
                ),
                params![archived],
            ),
            None => self.query_habits(
                &format!("SELECT {HABIT_COLUMNS} FROM habits ORDER BY created_at ASC"),
                params![],
            ),
        }
    }

    fn insert_check_in(&mut self, check_in: &CheckIn) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO check_ins ({CHECK_IN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                check_in.id,
                check_in.habit_id,
                format_date(check_in.date),
                check_in.completed,
                check_in.timestamp.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    fn delete_check_in(&mut self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM check_ins WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn list_check_ins(&self) -> Result<Vec<CheckIn>> {
        self.query_check_ins(
            &format!("SELECT {CHECK_IN_COLUMNS} FROM check_ins ORDER BY date ASC"),
            params![],
        )
    }

    fn check_ins_for_habit(&self, habit_id: &str) -> Result<Vec<CheckIn>> {
        self.query_check_ins(
            &format!("SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE habit_id = ?1 ORDER BY date ASC"),
            params![habit_id],
        )
    }

    fn delete_check_ins_for_habit(&mut self, habit_id: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM check_ins WHERE habit_id = ?1", params![habit_id])?;
        Ok(deleted)
    }

    fn get_settings(&self) -> Result<Option<Settings>> {
        let row = self
            .conn
            .query_row(
                "SELECT theme, notifications_enabled, created_at FROM settings WHERE id = ?1",
                params![SETTINGS_ID],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, bool>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((theme, notifications_enabled, created_at)) = row else {
            return Ok(None);
        };
        let theme: ThemeMode = theme.parse().map_err(|e: crate::error::ValidationError| {
            CoreError::from(DatabaseError::CorruptRow {
                table: "settings",
                message: e.to_string(),
            })
        })?;
        Ok(Some(Settings {
            theme,
            notifications_enabled,
            created_at: from_millis("settings", created_at)?,
        }))
    }

    fn put_settings(&mut self, settings: &Settings) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (id, theme, notifications_enabled, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                theme = excluded.theme,
                notifications_enabled = excluded.notifications_enabled",
            params![
                SETTINGS_ID,
                settings.theme.as_str(),
                settings.notifications_enabled,
                settings.created_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::NewHabit;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn habit_roundtrip_preserves_fields() {
        let mut db = Database::open_memory().unwrap();
        let habit = Habit::new(
            NewHabit::named("Meditate")
                .with_frequency(FrequencyRule::Custom {
                    specific_days: vec![1, 3],
                })
                .with_tags(["health"]),
            Utc::now(),
        )
        .unwrap();
        db.insert_habit(&habit).unwrap();

        let loaded = db.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Meditate");
        assert_eq!(loaded.frequency, habit.frequency);
        assert_eq!(loaded.tags, habit.tags);
        assert_eq!(
            loaded.created_at.timestamp_millis(),
            habit.created_at.timestamp_millis()
        );
        assert!(db.get_habit("missing").unwrap().is_none());
    }

    #[test]
    fn check_in_natural_key_is_unique() {
        let mut db = Database::open_memory().unwrap();
        db.insert_check_in(&CheckIn::new("h", date(1), Utc::now()))
            .unwrap();
        let dup = db.insert_check_in(&CheckIn::new("h", date(1), Utc::now()));
        assert!(matches!(dup, Err(CoreError::Database(_))));
    }

    #[test]
    fn delete_check_ins_for_habit_counts_rows() {
        let mut db = Database::open_memory().unwrap();
        db.insert_check_in(&CheckIn::new("a", date(1), Utc::now())).unwrap();
        db.insert_check_in(&CheckIn::new("a", date(2), Utc::now())).unwrap();
        db.insert_check_in(&CheckIn::new("b", date(2), Utc::now())).unwrap();

        assert_eq!(db.delete_check_ins_for_habit("a").unwrap(), 2);
        assert!(db.check_ins_for_habit("a").unwrap().is_empty());
        let rest = db.list_check_ins().unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].date, date(2));
    }

    #[test]
    fn settings_upsert_keeps_creation_time() {
        let mut db = Database::open_memory().unwrap();
        assert!(db.get_settings().unwrap().is_none());
        let mut settings = Settings::new(Utc::now());
        db.put_settings(&settings).unwrap();
        settings.theme = ThemeMode::Light;
        settings.notifications_enabled = true;
        db.put_settings(&settings).unwrap();

        let stored = db.get_settings().unwrap().unwrap();
        assert_eq!(stored.theme, ThemeMode::Light);
        assert!(stored.notifications_enabled);
        assert_eq!(
            stored.created_at.timestamp_millis(),
            settings.created_at.timestamp_millis()
        );
    }

    #[test]
    fn corrupt_frequency_is_reported() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO habits (id, name, frequency, created_at, updated_at)
                 VALUES ('x', 'x', 'not json', 0, 0)",
                params![],
            )
            .unwrap();
        let err = db.list_habits(None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Database(DatabaseError::CorruptRow { table: "habits", .. })
        ));
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("habits.db");
        {
            let mut db = Database::open_at(&path).unwrap();
            let habit = Habit::new(NewHabit::named("Walk"), Utc::now()).unwrap();
            db.insert_habit(&habit).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.list_habits(Some(false)).unwrap().len(), 1);
    }
}
