use serde::Serialize;

use super::{open_tracker, print_json, CmdResult};

#[derive(Serialize)]
struct StreakReport<'a> {
    habit_id: &'a str,
    current: u32,
    best: u32,
}

pub fn run(id: &str) -> CmdResult {
    let tracker = open_tracker()?;
    let today = habitroom_core::tracker::today();
    let streak = tracker
        .streak(id, today)
        .ok_or_else(|| format!("habit not found: {id}"))?;

    print_json(&StreakReport {
        habit_id: id,
        current: streak.current,
        best: streak.best,
    })
}
