//! Database schema migrations for habitroom.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!("failed to read schema_version: {e}");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: habits, check-ins and the settings singleton.
///
/// `(habit_id, date)` is the natural key of a check-in.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id            TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            description   TEXT,
            icon          TEXT NOT NULL DEFAULT '',
            color         TEXT NOT NULL DEFAULT '',
            frequency     TEXT NOT NULL,
            tags          TEXT NOT NULL DEFAULT '[]',
            reminder_time TEXT,
            created_at    INTEGER NOT NULL,
            updated_at    INTEGER NOT NULL,
            archived      INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS check_ins (
            id        TEXT PRIMARY KEY,
            habit_id  TEXT NOT NULL,
            date      TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 1,
            timestamp INTEGER NOT NULL,
            UNIQUE (habit_id, date)
        );

        CREATE TABLE IF NOT EXISTS settings (
            id                    TEXT PRIMARY KEY,
            theme                 TEXT NOT NULL DEFAULT 'system',
            notifications_enabled INTEGER NOT NULL DEFAULT 0,
            created_at            INTEGER NOT NULL
        );",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: indexes for the archived filter, creation ordering and
/// per-habit / per-date check-in scans.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_habits_archived ON habits(archived);
         CREATE INDEX IF NOT EXISTS idx_habits_created_at ON habits(created_at);
         CREATE INDEX IF NOT EXISTS idx_check_ins_habit_id ON check_ins(habit_id);
         CREATE INDEX IF NOT EXISTS idx_check_ins_date ON check_ins(date);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}
