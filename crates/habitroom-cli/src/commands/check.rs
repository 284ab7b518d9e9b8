//! Check-in commands for CLI.

use clap::Args;
use habitroom_core::CheckIn;

use super::{open_tracker, parse_date, print_json, CmdResult};

#[derive(Args)]
pub struct CheckArgs {
    /// Habit ID
    id: String,
    /// Date as YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args)]
pub struct CheckinsArgs {
    /// Only check-ins of this habit
    #[arg(long)]
    habit: Option<String>,
    /// Only check-ins on this date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,
}

pub fn run_check(args: CheckArgs) -> CmdResult {
    let mut tracker = open_tracker()?;
    let date = parse_date(args.date.as_deref())?;

    match tracker.toggle_on(&args.id, date)? {
        Some(true) => println!("Checked in: {} on {date}", args.id),
        Some(false) => println!("Check-in removed: {} on {date}", args.id),
        None => return Err(format!("habit not found: {}", args.id).into()),
    }
    Ok(())
}

pub fn run_list(args: CheckinsArgs) -> CmdResult {
    let tracker = open_tracker()?;
    let date = args.date.as_deref().map(|d| parse_date(Some(d))).transpose()?;

    let mut check_ins: Vec<&CheckIn> = match (&args.habit, date) {
        (Some(habit), _) => tracker.check_ins().all_for_habit(habit).collect(),
        (None, Some(date)) => tracker.check_ins().all_for_date(date).collect(),
        (None, None) => tracker.check_ins().iter().collect(),
    };
    if let Some(date) = date {
        check_ins.retain(|c| c.date == date);
    }
    check_ins.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.habit_id.cmp(&b.habit_id)));

    print_json(&check_ins)
}
