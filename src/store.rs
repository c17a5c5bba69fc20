//src/store.rs
use crate::db::{self, Error as DbError, NewWorkout, WorkoutFilters, WorkoutRecord};
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

/// The persistence collaborator the service talks to.
///
/// Implementations own durability and consistency. `list_workouts` must return
/// records ordered by date descending, and `insert_workouts` must either
/// persist the whole batch or nothing.
pub trait RecordStore {
    fn list_workouts(&self, filters: &WorkoutFilters) -> Result<Vec<WorkoutRecord>, DbError>;

    fn get_workout(&self, id: i64) -> Result<Option<WorkoutRecord>, DbError>;

    fn insert_workouts(&mut self, batch: &[NewWorkout]) -> Result<Vec<i64>, DbError>;

    fn delete_workout(&mut self, id: i64) -> Result<(), DbError>;

    /// Replaces a record with a new one and returns the new id.
    ///
    /// The default is a plain delete followed by an insert: if the insert
    /// fails the original record is already gone. Stores with transactions
    /// should override this.
    fn replace_workout(&mut self, id: i64, replacement: &NewWorkout) -> Result<i64, DbError> {
        self.delete_workout(id)?;
        let ids = self.insert_workouts(std::slice::from_ref(replacement))?;
        ids.first()
            .copied()
            .ok_or_else(|| DbError::Rejected("insert returned no id".to_string()))
    }

    fn list_exercise_names(&self) -> Result<Vec<String>, DbError>;

    fn insert_exercise_name(&mut self, name: &str) -> Result<(), DbError>;
}

/// `RecordStore` backed by a local SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = db::open_db(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, DbError> {
        db::init_db(&conn)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteStore {
    fn list_workouts(&self, filters: &WorkoutFilters) -> Result<Vec<WorkoutRecord>, DbError> {
        debug!(?filters, "listing workouts");
        db::list_workouts_filtered(&self.conn, filters)
    }

    fn get_workout(&self, id: i64) -> Result<Option<WorkoutRecord>, DbError> {
        db::get_workout(&self.conn, id)
    }

    fn insert_workouts(&mut self, batch: &[NewWorkout]) -> Result<Vec<i64>, DbError> {
        debug!(count = batch.len(), "inserting workouts");
        db::insert_workouts(&mut self.conn, batch)
    }

    fn delete_workout(&mut self, id: i64) -> Result<(), DbError> {
        debug!(id, "deleting workout");
        db::delete_workout(&self.conn, id)
    }

    fn replace_workout(&mut self, id: i64, replacement: &NewWorkout) -> Result<i64, DbError> {
        debug!(id, "replacing workout");
        db::replace_workout(&mut self.conn, id, replacement)
    }

    fn list_exercise_names(&self) -> Result<Vec<String>, DbError> {
        db::list_exercise_names(&self.conn)
    }

    fn insert_exercise_name(&mut self, name: &str) -> Result<(), DbError> {
        db::insert_exercise_name(&self.conn, name)
    }
}
