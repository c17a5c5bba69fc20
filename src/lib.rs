//src/lib.rs
use chrono::{Duration, Local, NaiveDate};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

// --- Declare modules ---
pub mod aggregate;
pub mod catalog;
mod config;
pub mod db;
pub mod export;
pub mod store;

// --- Expose public types ---
pub use aggregate::{
    bar_height_fraction, compute_exercise_progress, distinct_exercises, filter_workouts,
    group_by_date, group_by_exercise, matches_search, recent_sessions, DateGroup,
    ExerciseFilter, ExerciseProgress, HistoryQuery, ProgressPoint, ProgressStats,
};
pub use catalog::{normalize_exercise_name, parse_exercise_filter};
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, ConfigError, StandardColor, Theme,
};
pub use db::{
    get_db_path as get_db_path_util, Error as DbError, NewWorkout, WorkoutFilters,
    WorkoutRecord,
};
pub use store::{RecordStore, SqliteStore};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("No workouts found for {0}")]
    NotFound(NaiveDate),
    #[error("Record store error: {0}")]
    Store(#[from] DbError),
    #[error("Failed to replicate workouts: {0}")]
    ReplicationFailed(#[source] DbError),
}

/// Outcome of the catalog side effect of a save. The save itself already succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogUpdate {
    AlreadyKnown,
    Added,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: i64,
    pub exercise: String, // Normalized name that was stored
    pub catalog: CatalogUpdate,
}

#[derive(Default, Debug, Clone)]
pub struct EditWorkoutParams {
    pub id: i64,
    pub new_exercise: Option<String>,
    pub new_sets: Option<u32>,
    pub new_reps: Option<u32>,
    pub new_weight: Option<f64>,
    pub new_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadScope {
    All,
    /// Only records within `config.recent_window_days` of today.
    Recent,
}

pub struct AppService<S: RecordStore = SqliteStore> {
    pub config: Config,
    pub store: S,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    cache: HashMap<LoadScope, Vec<WorkoutRecord>>,
}

impl AppService<SqliteStore> {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> anyhow::Result<Self> {
        use anyhow::Context;

        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        Ok(Self::new(config, store, db_path, config_path))
    }
}

impl<S: RecordStore> AppService<S> {
    pub fn new(config: Config, store: S, db_path: PathBuf, config_path: PathBuf) -> Self {
        Self {
            config,
            store,
            db_path,
            config_path,
            cache: HashMap::new(),
        }
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// Sets how many days the recent history view covers.
    /// # Errors
    /// - `ConfigError::InvalidRecentWindow` if `days` is 0.
    /// - `ConfigError` variants if saving fails.
    pub fn set_recent_window_days(&mut self, days: u32) -> Result<(), ConfigError> {
        if days == 0 {
            return Err(ConfigError::InvalidRecentWindow(days));
        }
        self.config.recent_window_days = days;
        self.cache.remove(&LoadScope::Recent);
        self.save_config()
    }

    /// Sets how many sessions the progress chart draws.
    /// # Errors
    /// - `ConfigError::InvalidChartSessions` if `sessions` is 0.
    /// - `ConfigError` variants if saving fails.
    pub fn set_chart_sessions(&mut self, sessions: usize) -> Result<(), ConfigError> {
        if sessions == 0 {
            return Err(ConfigError::InvalidChartSessions(sessions));
        }
        self.config.chart_sessions = sessions;
        self.save_config()
    }

    /// Today's date in the user's local time zone.
    #[must_use]
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Drops every cached record list. Called after each successful mutation.
    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
    }

    /// Loads workouts, most recent day first. Results are cached per scope
    /// until the next mutation through this service.
    /// # Errors
    /// Returns `Error::Store` if the store query fails.
    pub fn load_workouts(&mut self, scope: LoadScope) -> Result<Vec<WorkoutRecord>, Error> {
        if let Some(cached) = self.cache.get(&scope) {
            debug!(?scope, count = cached.len(), "serving workouts from cache");
            return Ok(cached.clone());
        }

        let filters = match scope {
            LoadScope::All => WorkoutFilters::default(),
            LoadScope::Recent => WorkoutFilters {
                since: Some(Self::today() - Duration::days(i64::from(self.config.recent_window_days))),
                ..Default::default()
            },
        };
        let workouts = self.store.list_workouts(&filters)?;
        self.cache.insert(scope, workouts.clone());
        Ok(workouts)
    }

    /// Loads, filters and groups workouts for the history view.
    /// # Errors
    /// Returns `Error::Store` if the store query fails.
    pub fn history(
        &mut self,
        scope: LoadScope,
        query: &HistoryQuery,
    ) -> Result<Vec<DateGroup>, Error> {
        let workouts = self.load_workouts(scope)?;
        Ok(group_by_date(&query.apply(&workouts)))
    }

    /// Loads the filtered flat record set, e.g. for CSV export.
    /// # Errors
    /// Returns `Error::Store` if the store query fails.
    pub fn filtered_workouts(
        &mut self,
        scope: LoadScope,
        query: &HistoryQuery,
    ) -> Result<Vec<WorkoutRecord>, Error> {
        let workouts = self.load_workouts(scope)?;
        Ok(query.apply(&workouts))
    }

    /// Builds the progress view for one exercise.
    /// # Errors
    /// - `Error::Validation` if the exercise name is empty.
    /// - `Error::Store` if the store query fails.
    pub fn exercise_progress(&mut self, exercise: &str) -> Result<ExerciseProgress, Error> {
        let name = normalize_exercise_name(exercise)?;
        let own = self.store.list_workouts(&WorkoutFilters {
            exercise: Some(&name),
            ..Default::default()
        })?;
        Ok(compute_exercise_progress(&name, &own))
    }

    /// Catalog entries sorted ascending.
    /// # Errors
    /// Returns `Error::Store` if the catalog cannot be read.
    pub fn exercise_list(&self) -> Result<Vec<String>, Error> {
        let names = self.store.list_exercise_names()?;
        Ok(catalog::sorted_catalog(names))
    }

    fn validate(workout: NewWorkout) -> Result<NewWorkout, Error> {
        if workout.sets < 1 {
            return Err(Error::Validation("sets must be at least 1".to_string()));
        }
        if workout.reps < 1 {
            return Err(Error::Validation("reps must be at least 1".to_string()));
        }
        if !workout.weight.is_finite() || workout.weight < 0.0 {
            return Err(Error::Validation(format!(
                "weight must be a non-negative number (got {})",
                workout.weight
            )));
        }
        Ok(NewWorkout {
            exercise: normalize_exercise_name(&workout.exercise)?,
            ..workout
        })
    }

    /// Appends `name` to the catalog if it is not there yet. Never fails the caller.
    fn sync_catalog(&mut self, name: &str) -> CatalogUpdate {
        let known = match self.store.list_exercise_names() {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not read exercise catalog while saving '{name}': {e}");
                return CatalogUpdate::Failed(e.to_string());
            }
        };
        if catalog::contains(&known, name) {
            return CatalogUpdate::AlreadyKnown;
        }
        match self.store.insert_exercise_name(name) {
            Ok(()) => {
                info!("Added '{name}' to the exercise catalog");
                CatalogUpdate::Added
            }
            Err(e) => {
                warn!("Workout saved but '{name}' could not be added to the catalog: {e}");
                CatalogUpdate::Failed(e.to_string())
            }
        }
    }

    /// Validates, normalizes and stores a new workout, then makes sure its
    /// exercise is in the catalog.
    /// # Errors
    /// - `Error::Validation` for an empty name, sets/reps below 1 or a negative weight.
    /// - `Error::Store` if the insert fails. Catalog failures are reported in
    ///   `SaveOutcome::catalog` instead.
    pub fn save_workout(&mut self, workout: NewWorkout) -> Result<SaveOutcome, Error> {
        let workout = Self::validate(workout)?;
        let ids = self.store.insert_workouts(std::slice::from_ref(&workout))?;
        let id = ids
            .first()
            .copied()
            .ok_or_else(|| DbError::Rejected("insert returned no id".to_string()))?;
        self.invalidate_cache();

        let catalog = self.sync_catalog(&workout.exercise);
        Ok(SaveOutcome {
            id,
            exercise: workout.exercise,
            catalog,
        })
    }

    /// Replaces a workout with an edited copy. Fields left as `None` keep
    /// their current value. The edited workout gets a new id.
    /// # Errors
    /// - `Error::Store` wrapping `DbError::WorkoutNotFound` if `id` does not exist.
    /// - `Error::Validation` if the merged workout is invalid.
    pub fn edit_workout(&mut self, params: EditWorkoutParams) -> Result<SaveOutcome, Error> {
        let existing = self
            .store
            .get_workout(params.id)?
            .ok_or(DbError::WorkoutNotFound(params.id))?;

        let merged = NewWorkout {
            date: params.new_date.unwrap_or(existing.date),
            exercise: params.new_exercise.unwrap_or(existing.exercise),
            sets: params.new_sets.unwrap_or(existing.sets),
            reps: params.new_reps.unwrap_or(existing.reps),
            weight: params.new_weight.unwrap_or(existing.weight),
        };
        let merged = Self::validate(merged)?;

        let id = self.store.replace_workout(params.id, &merged)?;
        self.invalidate_cache();

        let catalog = self.sync_catalog(&merged.exercise);
        Ok(SaveOutcome {
            id,
            exercise: merged.exercise,
            catalog,
        })
    }

    /// Deletes workouts by id, stopping at the first failure.
    /// # Errors
    /// Returns `Error::Store` if an id does not exist or the delete fails.
    pub fn delete_workouts(&mut self, ids: &[i64]) -> Result<Vec<i64>, Error> {
        let mut deleted_ids = Vec::with_capacity(ids.len());
        let result = ids.iter().try_for_each(|&id| {
            self.store.delete_workout(id)?;
            deleted_ids.push(id);
            Ok::<(), DbError>(())
        });
        if !deleted_ids.is_empty() {
            self.invalidate_cache();
        }
        result?;
        Ok(deleted_ids)
    }

    /// Copies every workout logged on `source` onto today's date.
    /// # Errors
    /// See [`Self::replicate_day_onto`].
    pub fn replicate_day(&mut self, source: NaiveDate) -> Result<usize, Error> {
        self.replicate_day_onto(source, Self::today())
    }

    /// Copies every workout logged on `source` onto `target`, as one batch.
    /// Returns the number of workouts created.
    /// # Errors
    /// - `Error::Store` if the source day cannot be read.
    /// - `Error::NotFound` if nothing was logged on `source`; nothing is inserted.
    /// - `Error::ReplicationFailed` if the store rejects the batch; nothing is inserted.
    pub fn replicate_day_onto(
        &mut self,
        source: NaiveDate,
        target: NaiveDate,
    ) -> Result<usize, Error> {
        let day = self.store.list_workouts(&WorkoutFilters {
            date: Some(source),
            ..Default::default()
        })?;
        if day.is_empty() {
            return Err(Error::NotFound(source));
        }

        let copies: Vec<NewWorkout> = day
            .iter()
            .map(|w| NewWorkout::copy_of(w, target))
            .collect();
        let created = self
            .store
            .insert_workouts(&copies)
            .map_err(Error::ReplicationFailed)?;
        self.invalidate_cache();

        info!("Replicated {} workouts from {source} to {target}", created.len());
        Ok(created.len())
    }

    /// Adds every exercise name found in the workout history that the
    /// catalog lacks. Returns the names added.
    /// # Errors
    /// Returns `Error::Store` if reading either side or an insert fails.
    pub fn rebuild_catalog(&mut self) -> Result<Vec<String>, Error> {
        let workouts = self.store.list_workouts(&WorkoutFilters::default())?;
        let known = self.store.list_exercise_names()?;
        let missing = catalog::missing_names(&known, &distinct_exercises(&workouts));
        for name in &missing {
            self.store.insert_exercise_name(name)?;
        }
        Ok(missing)
    }
}
