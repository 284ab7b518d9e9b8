use clap::{Parser, Subcommand};
use habitroom_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitroom-cli", version, about = "Habitroom CLI")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Toggle a habit's check-in for a day
    Check(commands::check::CheckArgs),
    /// List check-ins
    Checkins(commands::check::CheckinsArgs),
    /// Current and best streak of a habit
    Streak {
        /// Habit ID
        id: String,
    },
    /// Completion statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Month calendar with per-day completion status
    Calendar(commands::calendar::CalendarArgs),
    /// Habits due on a day
    Due {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// User settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HABITROOM_LOG").unwrap_or_else(|_| {
        let configured = Config::load_or_default().log.filter;
        EnvFilter::try_new(configured).unwrap_or_else(|_| EnvFilter::new("warn"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Check(args) => commands::check::run_check(args),
        Commands::Checkins(args) => commands::check::run_list(args),
        Commands::Streak { id } => commands::streak::run(&id),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Calendar(args) => commands::calendar::run(args),
        Commands::Due { date } => commands::calendar::run_due(date.as_deref()),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
