//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdout};
use tracing_subscriber::EnvFilter;

use liftlog_lib::{
    bar_height_fraction, export, parse_color, parse_exercise_filter, recent_sessions,
    AppService, CatalogUpdate, DateGroup, EditWorkoutParams, Error, ExerciseProgress,
    HistoryQuery, LoadScope, NewWorkout, SaveOutcome,
};

const CHART_WIDTH: usize = 40;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli_args = cli::parse_args();
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();
        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;
    let header_color: Color = parse_color(&service.config.theme.header_color)
        .map(Into::into)
        .unwrap_or_else(|e| {
            tracing::warn!("{e}, falling back to green table headers");
            Color::Green
        });

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Add {
            exercise,
            sets,
            reps,
            weight,
            date,
        } => {
            let workout = NewWorkout {
                date,
                exercise,
                sets,
                reps,
                weight,
            };
            match service.save_workout(workout) {
                Ok(outcome) => report_save("Saved", &outcome),
                Err(e) => bail!("Error saving workout: {e}"),
            }
        }
        cli::Commands::Edit {
            id,
            exercise,
            sets,
            reps,
            weight,
            date,
        } => {
            let params = EditWorkoutParams {
                id,
                new_exercise: exercise,
                new_sets: sets,
                new_reps: reps,
                new_weight: weight,
                new_date: date,
            };
            match service.edit_workout(params) {
                Ok(outcome) => report_save(&format!("Updated workout {id} as"), &outcome),
                Err(e) => bail!("Error editing workout {id}: {e}"),
            }
        }
        cli::Commands::Delete { ids } => match service.delete_workouts(&ids) {
            Ok(deleted) => println!("Deleted workout(s): {deleted:?}"),
            Err(e) => bail!("Error deleting workouts: {e}"),
        },
        cli::Commands::List {
            recent,
            exercise,
            search,
            start,
            end,
        } => {
            if start.is_some() != end.is_some() {
                eprintln!("Note: date range ignored, both --start and --end are needed.");
            }
            let exercise = match exercise.as_deref().map(parse_exercise_filter).transpose() {
                Ok(filter) => filter.unwrap_or_default(),
                Err(e) => bail!("Invalid --exercise value: {e}"),
            };
            let query = HistoryQuery {
                search,
                exercise,
                start_date: start,
                end_date: end,
            };
            let scope = if recent { LoadScope::Recent } else { LoadScope::All };

            if export_csv {
                let workouts = service
                    .filtered_workouts(scope, &query)
                    .context("Failed to load workouts")?;
                export::write_history_csv(&workouts, stdout().lock())?;
            } else {
                let groups = service
                    .history(scope, &query)
                    .context("Failed to load workouts")?;
                if groups.is_empty() {
                    println!("No workouts found matching the criteria.");
                } else {
                    print_history(&groups, header_color);
                }
            }
        }
        cli::Commands::Exercises => {
            let names = service
                .exercise_list()
                .context("Failed to load exercises")?;
            if names.is_empty() {
                println!("No exercises logged yet.");
            }
            for name in names {
                println!("{name}");
            }
        }
        cli::Commands::Progress { exercise } => {
            let progress = service
                .exercise_progress(&exercise)
                .with_context(|| format!("Failed to compute progress for '{exercise}'"))?;
            if export_csv {
                export::write_progress_csv(&progress.series, stdout().lock())?;
            } else {
                print_progress(&progress, service.config.chart_sessions, header_color);
            }
        }
        cli::Commands::Replicate { date } => match service.replicate_day(date) {
            Ok(count) => println!("Successfully replicated {count} workouts from {date} to today."),
            Err(Error::NotFound(day)) => bail!("No workouts found for {day}"),
            Err(e) => bail!("Error replicating workouts: {e}"),
        },
        cli::Commands::RebuildCatalog => {
            let added = service
                .rebuild_catalog()
                .context("Failed to rebuild the exercise catalog")?;
            if added.is_empty() {
                println!("Catalog already up to date.");
            } else {
                println!("Added {} exercise(s): {}", added.len(), added.join(", "));
            }
        }
        cli::Commands::DbPath => {
            println!("Database file is located at: {:?}", service.get_db_path());
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
        cli::Commands::SetRecentWindow { days } => {
            service
                .set_recent_window_days(days)
                .context("Failed to set recent window")?;
            println!("Recent history now covers the last {days} day(s).");
        }
        cli::Commands::SetChartSessions { sessions } => {
            service
                .set_chart_sessions(sessions)
                .context("Failed to set chart sessions")?;
            println!("Progress chart now shows the last {sessions} session(s).");
        }
    }

    Ok(())
}

fn report_save(verb: &str, outcome: &SaveOutcome) {
    println!("{verb}: {} (ID: {})", outcome.exercise, outcome.id);
    match &outcome.catalog {
        CatalogUpdate::Added => println!("New exercise '{}' added to the catalog.", outcome.exercise),
        CatalogUpdate::AlreadyKnown => {}
        CatalogUpdate::Failed(reason) => eprintln!(
            "Warning: workout saved, but '{}' could not be added to the catalog: {reason}",
            outcome.exercise
        ),
    }
}

fn print_history(groups: &[DateGroup], header_color: Color) {
    for group in groups {
        println!("{}", group.date.format("%A, %b %-d %Y"));
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("ID").fg(header_color),
                Cell::new("Exercise").fg(header_color),
                Cell::new("Sets").fg(header_color),
                Cell::new("Reps").fg(header_color),
                Cell::new("Weight (kg)").fg(header_color),
            ]);
        for workout in &group.workouts {
            table.add_row(vec![
                Cell::new(workout.id),
                Cell::new(&workout.exercise),
                Cell::new(workout.sets),
                Cell::new(workout.reps),
                Cell::new(workout.weight),
            ]);
        }
        println!("{table}\n");
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn print_progress(progress: &ExerciseProgress, sessions: usize, header_color: Color) {
    let stats = &progress.stats;
    let sign = if stats.progress > 0.0 { "+" } else { "" };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new(&progress.exercise).fg(header_color),
            Cell::new("Value").fg(header_color),
        ]);
    table.add_row(vec!["Current Weight".to_string(), format!("{} kg", stats.current)]);
    table.add_row(vec!["Max Weight".to_string(), format!("{} kg", stats.max)]);
    table.add_row(vec!["Average Weight".to_string(), format!("{} kg", stats.average)]);
    table.add_row(vec![
        "Progress".to_string(),
        format!("{sign}{} kg ({}%)", stats.progress, stats.progress_percent),
    ]);
    println!("{table}");

    if progress.series.is_empty() {
        println!("No sessions logged for {} yet.", progress.exercise);
        return;
    }

    let shown = recent_sessions(&progress.series, sessions);
    println!("\nLast {} Sessions", shown.len());
    for point in shown {
        let fraction = bar_height_fraction(point.weight, shown);
        let bar_len = (fraction * CHART_WIDTH as f64).round() as usize;
        println!(
            "{}  {:<width$}  {} kg",
            point.date.format("%Y-%m-%d"),
            "█".repeat(bar_len),
            point.weight,
            width = CHART_WIDTH
        );
    }
}
