use clap::Subcommand;
use habitroom_core::ThemeMode;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show current settings
    Show,
    /// Set the theme: light, dark or system
    Theme {
        mode: String,
    },
    /// Enable or disable notifications
    Notifications {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

pub fn run(action: SettingsAction) -> CmdResult {
    let mut tracker = open_tracker()?;

    match action {
        SettingsAction::Show => print_json(tracker.settings())?,
        SettingsAction::Theme { mode } => {
            let theme: ThemeMode = mode.parse()?;
            tracker.set_theme(theme)?;
            println!("theme: {theme}");
        }
        SettingsAction::Notifications { enabled } => {
            tracker.set_notifications(enabled)?;
            println!("notifications: {}", if enabled { "on" } else { "off" });
        }
    }
    Ok(())
}
