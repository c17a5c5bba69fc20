//src/aggregate.rs
//! Pure transforms from a flat record list into history and progress views.
//! Nothing here touches the store.
use crate::db::WorkoutRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const MIN_BAR_FRACTION: f64 = 0.2;
const BAR_SPAN: f64 = 0.8;

/// All records logged on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub workouts: Vec<WorkoutRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExerciseFilter {
    #[default]
    All,
    Only(String),
}

impl ExerciseFilter {
    #[must_use]
    pub fn matches(&self, exercise: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(name) => name == exercise,
        }
    }
}

impl FromStr for ExerciseFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            Ok(Self::All)
        } else {
            Ok(Self::Only(s.to_string()))
        }
    }
}

impl fmt::Display for ExerciseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Only(name) => write!(f, "{name}"),
        }
    }
}

/// Every filter the history view can apply at once. All active filters must match.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub search: Option<String>,
    pub exercise: ExerciseFilter,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl HistoryQuery {
    #[must_use]
    pub fn apply(&self, records: &[WorkoutRecord]) -> Vec<WorkoutRecord> {
        let mut filtered =
            filter_workouts(records, &self.exercise, self.start_date, self.end_date);
        if let Some(term) = self.search.as_deref() {
            filtered.retain(|w| matches_search(w, term));
        }
        filtered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressStats {
    pub current: f64,
    pub max: f64,
    pub average: f64,
    pub progress: f64,
    pub progress_percent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgress {
    pub exercise: String,
    pub series: Vec<ProgressPoint>,
    pub stats: ProgressStats,
}

/// Groups records by day, most recent day first.
/// Records within a day keep their input order.
#[must_use]
pub fn group_by_date(records: &[WorkoutRecord]) -> Vec<DateGroup> {
    let mut groups: BTreeMap<NaiveDate, Vec<WorkoutRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.date).or_default().push(record.clone());
    }
    groups
        .into_iter()
        .rev()
        .map(|(date, workouts)| DateGroup { date, workouts })
        .collect()
}

#[must_use]
pub fn group_by_exercise(records: &[WorkoutRecord]) -> BTreeMap<String, Vec<WorkoutRecord>> {
    let mut groups: BTreeMap<String, Vec<WorkoutRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.exercise.clone())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// Filters by exercise and an inclusive date range.
///
/// The range only applies when both `start_date` and `end_date` are given;
/// a single bound disables date filtering.
#[must_use]
pub fn filter_workouts(
    records: &[WorkoutRecord],
    exercise_filter: &ExerciseFilter,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Vec<WorkoutRecord> {
    let range = start_date.zip(end_date);
    records
        .iter()
        .filter(|w| exercise_filter.matches(&w.exercise))
        .filter(|w| range.map_or(true, |(start, end)| start <= w.date && w.date <= end))
        .cloned()
        .collect()
}

/// Case-insensitive substring match on the exercise name.
#[must_use]
pub fn matches_search(record: &WorkoutRecord, term: &str) -> bool {
    record
        .exercise
        .to_lowercase()
        .contains(&term.to_lowercase())
}

/// Sorted, de-duplicated exercise names found in `records`.
#[must_use]
pub fn distinct_exercises(records: &[WorkoutRecord]) -> Vec<String> {
    records
        .iter()
        .map(|w| w.exercise.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Builds the weight series and summary stats for one exercise.
///
/// Every record becomes a point, including several on the same day. An empty
/// input gives an empty series with all stats at zero.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn compute_exercise_progress(exercise: &str, records: &[WorkoutRecord]) -> ExerciseProgress {
    let mut sorted: Vec<&WorkoutRecord> = records.iter().collect();
    sorted.sort_by_key(|w| w.date); // stable

    let series: Vec<ProgressPoint> = sorted
        .iter()
        .map(|w| ProgressPoint {
            date: w.date,
            weight: w.weight,
        })
        .collect();

    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return ExerciseProgress {
            exercise: exercise.to_string(),
            series,
            stats: ProgressStats::default(),
        };
    };

    let first_weight = first.weight;
    let current = last.weight;
    let max = series.iter().map(|p| p.weight).fold(f64::MIN, f64::max);
    let total: f64 = series.iter().map(|p| p.weight).sum();
    let average = round_to_tenth(total / series.len() as f64);
    let progress = round_to_tenth(current - first_weight);
    let progress_percent = if first_weight > 0.0 {
        (progress / first_weight * 100.0).round() as i64
    } else {
        0
    };

    ExerciseProgress {
        exercise: exercise.to_string(),
        series,
        stats: ProgressStats {
            current,
            max,
            average,
            progress,
            progress_percent,
        },
    }
}

/// Height of a chart bar as a fraction of the chart, between 0.2 and 1.0.
///
/// The lightest point of the series maps to 0.2 and the heaviest to 1.0. When
/// every point has the same weight the range is treated as 1, so all bars sit
/// at 0.2. An empty series also gives 0.2.
#[must_use]
pub fn bar_height_fraction(weight: f64, series: &[ProgressPoint]) -> f64 {
    if series.is_empty() {
        return MIN_BAR_FRACTION;
    }
    let min = series.iter().map(|p| p.weight).fold(f64::MAX, f64::min);
    let max = series.iter().map(|p| p.weight).fold(f64::MIN, f64::max);
    let range = max - min;
    let denominator = if range == 0.0 { 1.0 } else { range };
    let fraction = (weight - min) / denominator * BAR_SPAN + MIN_BAR_FRACTION;
    fraction.clamp(MIN_BAR_FRACTION, 1.0)
}

/// The last `count` points of a series, the window a chart shows.
#[must_use]
pub fn recent_sessions(series: &[ProgressPoint], count: usize) -> &[ProgressPoint] {
    let start = series.len().saturating_sub(count);
    &series[start..]
}
