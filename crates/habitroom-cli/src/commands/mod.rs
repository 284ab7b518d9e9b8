pub mod calendar;
pub mod check;
pub mod completions;
pub mod config;
pub mod habit;
pub mod settings;
pub mod stats;
pub mod streak;

use chrono::NaiveDate;
use habitroom_core::{Config, Database, Tracker};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the configured database and load the tracker over it.
pub fn open_tracker() -> Result<Tracker<Database>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let path = config.database_path()?;
    tracing::debug!(path = %path.display(), "opening tracker");
    let db = Database::open_at(&path)?;
    let tracker = Tracker::open_with(db, config.streak_calculator(), config.stats_analyzer())?;
    Ok(tracker)
}

/// Parse `YYYY-MM-DD`, defaulting to today.
pub fn parse_date(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(s) => Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{s}': {e}"))?),
        None => Ok(habitroom_core::tracker::today()),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Split a comma-separated list, dropping empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
