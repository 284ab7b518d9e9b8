use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use super::{open_tracker, parse_date, print_json, CmdResult};

#[derive(Args)]
pub struct CalendarArgs {
    /// Month as YYYY-MM (default: current month)
    #[arg(long)]
    month: Option<String>,
    /// Restrict to one habit
    #[arg(long)]
    habit: Option<String>,
}

#[derive(Serialize)]
struct DueHabit<'a> {
    id: &'a str,
    name: &'a str,
    icon: &'a str,
    done: bool,
}

fn parse_month(month: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match month {
        Some(s) => Ok(NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map_err(|e| format!("invalid month '{s}': {e}"))?),
        None => Ok(habitroom_core::tracker::today()),
    }
}

pub fn run(args: CalendarArgs) -> CmdResult {
    let tracker = open_tracker()?;
    let month = parse_month(args.month.as_deref())?;
    let today = habitroom_core::tracker::today();

    let days = tracker.month_calendar(month, args.habit.as_deref(), today);
    print_json(&days)
}

pub fn run_due(date: Option<&str>) -> CmdResult {
    let tracker = open_tracker()?;
    let date = parse_date(date)?;

    let due: Vec<DueHabit<'_>> = tracker
        .due_on(date)
        .into_iter()
        .map(|h| DueHabit {
            id: &h.id,
            name: &h.name,
            icon: &h.icon,
            done: tracker.check_ins().is_done(&h.id, date),
        })
        .collect();
    print_json(&due)
}
