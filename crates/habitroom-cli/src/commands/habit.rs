//! Habit management commands for CLI.

use clap::{Args, Subcommand, ValueEnum};
use habitroom_core::{FrequencyRule, HabitPatch, NewHabit};

use super::{open_tracker, print_json, split_list, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum FrequencyKind {
    Daily,
    Weekly,
    Custom,
}

/// Frequency flags shared by create and update.
#[derive(Args)]
pub struct FrequencyArgs {
    /// Frequency type
    #[arg(long)]
    frequency: Option<FrequencyKind>,
    /// Target days per week for weekly habits (1-7, default: 3)
    #[arg(long)]
    days_per_week: Option<u8>,
    /// Comma-separated weekdays for custom habits (0=Sun .. 6=Sat)
    #[arg(long)]
    days: Option<String>,
}

impl FrequencyArgs {
    fn rule(&self) -> Result<Option<FrequencyRule>, Box<dyn std::error::Error>> {
        let kind = match (self.frequency, &self.days, self.days_per_week) {
            (Some(kind), _, _) => kind,
            (None, Some(_), _) => FrequencyKind::Custom,
            (None, None, Some(_)) => FrequencyKind::Weekly,
            (None, None, None) => return Ok(None),
        };
        let rule = match kind {
            FrequencyKind::Daily => FrequencyRule::Daily,
            FrequencyKind::Weekly => FrequencyRule::Weekly {
                days_per_week: self.days_per_week.unwrap_or(3),
            },
            FrequencyKind::Custom => {
                let raw = self.days.as_deref().unwrap_or_default();
                let specific_days = split_list(raw)
                    .iter()
                    .map(|d| d.parse::<u8>().map_err(|e| format!("invalid weekday '{d}': {e}")))
                    .collect::<Result<Vec<_>, _>>()?;
                FrequencyRule::Custom { specific_days }
            }
        };
        Ok(Some(rule))
    }
}

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit name
        name: String,
        /// Habit description
        #[arg(long)]
        description: Option<String>,
        /// Icon (emoji)
        #[arg(long)]
        icon: Option<String>,
        /// Color (e.g. "#22c55e")
        #[arg(long)]
        color: Option<String>,
        #[command(flatten)]
        frequency: FrequencyArgs,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Reminder time as HH:MM
        #[arg(long)]
        reminder: Option<String>,
    },
    /// List active habits
    List {
        /// Only habits carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Get habit details
    Get {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description (empty to clear)
        #[arg(long)]
        description: Option<String>,
        /// New icon
        #[arg(long)]
        icon: Option<String>,
        /// New color
        #[arg(long)]
        color: Option<String>,
        #[command(flatten)]
        frequency: FrequencyArgs,
        /// Comma-separated tags (empty to clear)
        #[arg(long)]
        tags: Option<String>,
        /// Reminder time as HH:MM (empty to clear)
        #[arg(long)]
        reminder: Option<String>,
    },
    /// Delete a habit and its check-ins
    Delete {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> CmdResult {
    let mut tracker = open_tracker()?;

    match action {
        HabitAction::Create {
            name,
            description,
            icon,
            color,
            frequency,
            tags,
            reminder,
        } => {
            let mut fields = NewHabit::named(name);
            fields.description = description;
            if let Some(icon) = icon {
                fields.icon = icon;
            }
            if let Some(color) = color {
                fields.color = color;
            }
            if let Some(rule) = frequency.rule()? {
                fields.frequency = rule;
            }
            fields.tags = tags.as_deref().map(split_list).unwrap_or_default();
            fields.reminder_time = reminder;

            let habit = tracker.create_habit(fields)?;
            println!("Habit created: {}", habit.id);
            print_json(&habit)?;
        }
        HabitAction::List { tag } => match tag {
            Some(tag) => {
                let habits: Vec<_> = tracker.registry().with_tag(&tag).collect();
                print_json(&habits)?;
            }
            None => print_json(tracker.habits())?,
        },
        HabitAction::Get { id } => match tracker.habit(&id) {
            Some(habit) => print_json(habit)?,
            None => return Err(format!("habit not found: {id}").into()),
        },
        HabitAction::Update {
            id,
            name,
            description,
            icon,
            color,
            frequency,
            tags,
            reminder,
        } => {
            let patch = HabitPatch {
                name,
                description,
                icon,
                color,
                frequency: frequency.rule()?,
                tags: tags.as_deref().map(split_list),
                reminder_time: reminder,
            };
            if patch.is_empty() {
                println!("nothing to update");
                return Ok(());
            }
            match tracker.update_habit(&id, patch)? {
                Some(habit) => {
                    println!("Habit updated: {}", habit.id);
                    print_json(&habit)?;
                }
                None => return Err(format!("habit not found: {id}").into()),
            }
        }
        HabitAction::Delete { id } => {
            if tracker.delete_habit(&id)? {
                println!("Habit deleted: {id}");
            } else {
                return Err(format!("habit not found: {id}").into());
            }
        }
    }
    Ok(())
}
