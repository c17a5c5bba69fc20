// src/cli.rs
use chrono::{Duration, Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "A CLI tool to log lifts and track progress", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    /// Print tabular output as CSV instead
    #[arg(long, global = true)]
    pub export_csv: bool,
}

// Custom parser for date strings and shorthands
pub fn parse_date_shorthand(s: &str) -> Result<NaiveDate, String> {
    match s.to_lowercase().as_str() {
        "today" => Ok(Local::now().date_naive()),
        "yesterday" => Ok((Local::now() - Duration::days(1)).date_naive()),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
            .map_err(|_| {
                format!(
                    "Invalid date format: '{s}'. Use 'today', 'yesterday', YYYY-MM-DD, DD.MM.YYYY, or YYYY/MM/DD."
                )
            }),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a new workout entry
    Add {
        /// Name of the exercise (e.g. "bench press"), stored in title case
        #[arg(short, long)]
        exercise: String,
        /// Number of sets performed
        #[arg(short, long, default_value_t = 1)]
        sets: u32,
        /// Number of repetitions per set
        #[arg(short, long)]
        reps: u32,
        /// Weight used in kg
        #[arg(short, long, default_value_t = 0.0)]
        weight: f64,
        /// Date of the workout (defaults to today)
        #[arg(short, long, value_parser = parse_date_shorthand, default_value = "today")]
        date: NaiveDate,
    },
    /// Edit a workout entry (it is re-created with a new ID)
    Edit {
        /// ID of the workout to edit
        id: i64,
        #[arg(short, long)]
        exercise: Option<String>,
        #[arg(short, long)]
        sets: Option<u32>,
        #[arg(short, long)]
        reps: Option<u32>,
        #[arg(short, long)]
        weight: Option<f64>,
        #[arg(short, long, value_parser = parse_date_shorthand)]
        date: Option<NaiveDate>,
    },
    /// Delete one or more workout entries
    Delete {
        /// IDs of the workouts to delete
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Show workout history grouped by day
    List {
        /// Only load the recent window (see set-recent-window)
        #[arg(long)]
        recent: bool,
        /// Only show this exercise ("All" shows every exercise)
        #[arg(short, long)]
        exercise: Option<String>,
        /// Case-insensitive text to search for in exercise names
        #[arg(long)]
        search: Option<String>,
        /// Start of the date range (ignored unless --end is also given)
        #[arg(long, value_parser = parse_date_shorthand)]
        start: Option<NaiveDate>,
        /// End of the date range (ignored unless --start is also given)
        #[arg(long, value_parser = parse_date_shorthand)]
        end: Option<NaiveDate>,
    },
    /// List known exercise names
    Exercises,
    /// Show progress stats and a chart for one exercise
    Progress {
        /// Name of the exercise
        exercise: String,
    },
    /// Copy every workout from a day onto today
    Replicate {
        /// Day to copy from
        #[arg(value_parser = parse_date_shorthand)]
        date: NaiveDate,
    },
    /// Add any exercise found in the history but missing from the catalog
    RebuildCatalog,
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Set how many days `list --recent` covers
    SetRecentWindow { days: u32 },
    /// Set how many sessions the progress chart draws
    SetChartSessions { sessions: usize },
    /// Generate shell completion script
    GenerateCompletion {
        /// The shell to generate the script for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
