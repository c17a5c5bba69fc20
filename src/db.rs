//src/db.rs
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single logged workout entry as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub exercise: String, // Always the normalized (title case) name
    pub sets: u32,
    pub reps: u32,
    pub weight: f64, // kg
}

/// A workout entry that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkout {
    pub date: NaiveDate,
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
}

impl NewWorkout {
    /// Field-for-field copy of an existing record, moved onto `date`.
    #[must_use]
    pub fn copy_of(record: &WorkoutRecord, date: NaiveDate) -> Self {
        Self {
            date,
            exercise: record.exercise.clone(),
            sets: record.sets,
            reps: record.reps,
            weight: record.weight,
        }
    }
}

// Custom Error type for DB operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection failed: {0}")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Workout entry not found: ID {0}")]
    WorkoutNotFound(i64),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database insert failed: {0}")]
    InsertFailed(rusqlite::Error),
    #[error("Database delete failed: {0}")]
    DeleteFailed(rusqlite::Error),
    #[error("Record store rejected the request: {0}")]
    Rejected(String),
}

const DB_FILE_NAME: &str = "workouts.sqlite";
const APP_DATA_DIR: &str = "liftlog";

/// Gets the path to the SQLite database file within the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn get_db_path() -> Result<PathBuf, Error> {
    let data_dir = dirs::data_dir().ok_or(Error::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, Error> {
    Connection::open(path).map_err(Error::Connection)
}

/// Initializes the database tables if they don't exist.
pub fn init_db(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS workouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_date TEXT NOT NULL,        -- YYYY-MM-DD, no time component
            exercise TEXT NOT NULL,
            sets INTEGER NOT NULL CHECK(sets >= 1),
            reps INTEGER NOT NULL CHECK(reps >= 1),
            weight REAL NOT NULL CHECK(weight >= 0)
        )",
        [],
    )
    .map_err(Error::Connection)?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_workouts_date ON workouts(workout_date)",
        [],
    )
    .map_err(Error::Connection)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS exercises (
            name TEXT PRIMARY KEY NOT NULL -- Case-sensitive, names are normalized before insert
        )",
        [],
    )
    .map_err(Error::Connection)?;

    Ok(())
}

fn insert_one(conn: &Connection, workout: &NewWorkout) -> Result<i64, Error> {
    conn.execute(
        "INSERT INTO workouts (workout_date, exercise, sets, reps, weight)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            workout.date,
            workout.exercise,
            workout.sets,
            workout.reps,
            workout.weight
        ],
    )
    .map_err(Error::InsertFailed)?;
    Ok(conn.last_insert_rowid())
}

/// Inserts a batch of workouts inside one transaction. Either every row is
/// written or none is.
pub fn insert_workouts(conn: &mut Connection, batch: &[NewWorkout]) -> Result<Vec<i64>, Error> {
    let tx = conn.transaction().map_err(Error::InsertFailed)?;
    let mut ids = Vec::with_capacity(batch.len());
    for workout in batch {
        ids.push(insert_one(&tx, workout)?); // Dropping tx on error rolls back
    }
    tx.commit().map_err(Error::InsertFailed)?;
    Ok(ids)
}

/// Deletes a workout entry from the database by its ID.
pub fn delete_workout(conn: &Connection, id: i64) -> Result<(), Error> {
    let rows_affected = conn
        .execute("DELETE FROM workouts WHERE id = ?1", params![id])
        .map_err(Error::DeleteFailed)?;

    if rows_affected == 0 {
        Err(Error::WorkoutNotFound(id))
    } else {
        Ok(())
    }
}

/// Deletes `id` and inserts `replacement` in a single transaction.
/// Returns the id of the inserted row.
pub fn replace_workout(
    conn: &mut Connection,
    id: i64,
    replacement: &NewWorkout,
) -> Result<i64, Error> {
    let tx = conn.transaction().map_err(Error::InsertFailed)?;
    delete_workout(&tx, id)?;
    let new_id = insert_one(&tx, replacement)?;
    tx.commit().map_err(Error::InsertFailed)?;
    Ok(new_id)
}

// Helper function to map a database row to a WorkoutRecord
fn map_row_to_workout(row: &Row) -> Result<WorkoutRecord, rusqlite::Error> {
    Ok(WorkoutRecord {
        id: row.get(0)?,
        date: row.get(1)?,
        exercise: row.get(2)?,
        sets: row.get(3)?,
        reps: row.get(4)?,
        weight: row.get(5)?,
    })
}

/// Retrieves a single workout by ID.
pub fn get_workout(conn: &Connection, id: i64) -> Result<Option<WorkoutRecord>, Error> {
    let mut stmt = conn
        .prepare(
            "SELECT id, workout_date, exercise, sets, reps, weight FROM workouts WHERE id = ?1",
        )
        .map_err(Error::QueryFailed)?;
    stmt.query_row(params![id], map_row_to_workout)
        .optional()
        .map_err(Error::QueryFailed)
}

// Struct to hold filter criteria for list_workouts_filtered
#[derive(Default, Debug, Clone, Copy)]
pub struct WorkoutFilters<'a> {
    pub date: Option<NaiveDate>,     // Exact day match
    pub exercise: Option<&'a str>,   // Exact, case-sensitive name match
    pub since: Option<NaiveDate>,    // date >= since
}

/// Lists workout entries, most recent day first. Entries sharing a day keep
/// insertion order.
pub fn list_workouts_filtered(
    conn: &Connection,
    filters: &WorkoutFilters,
) -> Result<Vec<WorkoutRecord>, Error> {
    let mut sql = "SELECT id, workout_date, exercise, sets, reps, weight FROM workouts WHERE 1=1"
        .to_string();
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(date) = filters.date {
        sql.push_str(&format!(" AND workout_date = ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(date));
    }
    if let Some(name) = filters.exercise {
        sql.push_str(&format!(" AND exercise = ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(name.to_string()));
    }
    if let Some(since) = filters.since {
        sql.push_str(&format!(" AND workout_date >= ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(since));
    }
    sql.push_str(" ORDER BY workout_date DESC, id ASC");

    let params_slice: Vec<&dyn ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();

    let mut stmt = conn.prepare(&sql).map_err(Error::QueryFailed)?;
    let workout_iter = stmt
        .query_map(params_slice.as_slice(), map_row_to_workout)
        .map_err(Error::QueryFailed)?;

    workout_iter
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::QueryFailed)
}

// ---- Exercise Catalog Functions ----

/// Lists every catalog entry, in no particular order.
pub fn list_exercise_names(conn: &Connection) -> Result<Vec<String>, Error> {
    let mut stmt = conn
        .prepare("SELECT name FROM exercises")
        .map_err(Error::QueryFailed)?;
    let names = stmt
        .query_map([], |row| row.get(0))
        .map_err(Error::QueryFailed)?;
    names
        .collect::<Result<Vec<String>, _>>()
        .map_err(Error::QueryFailed)
}

/// Appends a name to the catalog. Inserting a name that is already present is a no-op.
pub fn insert_exercise_name(conn: &Connection, name: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO exercises (name) VALUES (?1)",
        params![name],
    )
    .map_err(Error::InsertFailed)?;
    Ok(())
}
