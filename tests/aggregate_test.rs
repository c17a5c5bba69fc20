use chrono::NaiveDate;
use liftlog_lib::{
    bar_height_fraction, compute_exercise_progress, distinct_exercises, filter_workouts,
    group_by_date, group_by_exercise, recent_sessions, ExerciseFilter, HistoryQuery,
    ProgressPoint, ProgressStats, WorkoutRecord,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(id: i64, day: NaiveDate, exercise: &str, weight: f64) -> WorkoutRecord {
    WorkoutRecord {
        id,
        date: day,
        exercise: exercise.to_string(),
        sets: 3,
        reps: 8,
        weight,
    }
}

// Storage order: most recent day first
fn sample_history() -> Vec<WorkoutRecord> {
    vec![
        record(5, date(2024, 3, 10), "Squat", 100.0),
        record(6, date(2024, 3, 10), "Bench Press", 70.0),
        record(3, date(2024, 3, 8), "Bench Press", 67.5),
        record(4, date(2024, 3, 8), "Deadlift", 140.0),
        record(1, date(2024, 3, 1), "Bench Press", 65.0),
        record(2, date(2024, 3, 1), "Squat", 95.0),
    ]
}

#[test]
fn test_group_by_date_orders_days_descending_and_keeps_input_order() {
    let mut records = sample_history();
    records.reverse(); // Oldest first on input, groups must still come out newest first

    let groups = group_by_date(&records);
    let days: Vec<NaiveDate> = groups.iter().map(|g| g.date).collect();
    assert_eq!(days, vec![date(2024, 3, 10), date(2024, 3, 8), date(2024, 3, 1)]);

    let ids: Vec<i64> = groups[0].workouts.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![6, 5]);
}

#[test]
fn test_group_by_date_loses_nothing() {
    let records = sample_history();
    let groups = group_by_date(&records);

    let mut flattened: Vec<i64> = groups
        .iter()
        .flat_map(|g| g.workouts.iter().map(|w| w.id))
        .collect();
    flattened.sort_unstable();
    assert_eq!(flattened, vec![1, 2, 3, 4, 5, 6]);
    assert!(group_by_date(&[]).is_empty());
}

#[test]
fn test_group_by_exercise() {
    let groups = group_by_exercise(&sample_history());
    assert_eq!(groups.len(), 3);

    let bench_ids: Vec<i64> = groups["Bench Press"].iter().map(|w| w.id).collect();
    assert_eq!(bench_ids, vec![6, 3, 1]);
    assert_eq!(groups["Deadlift"].len(), 1);
    assert!(!groups.contains_key("bench press"));
}

#[test]
fn test_filter_workouts_identity_without_filters() {
    let records = sample_history();
    assert_eq!(filter_workouts(&records, &ExerciseFilter::All, None, None), records);
}

#[test]
fn test_filter_workouts_needs_both_bounds() {
    let records = sample_history();
    let unfiltered = filter_workouts(&records, &ExerciseFilter::All, None, None);

    let start_only = filter_workouts(&records, &ExerciseFilter::All, Some(date(2024, 3, 9)), None);
    let end_only = filter_workouts(&records, &ExerciseFilter::All, None, Some(date(2024, 3, 2)));
    assert_eq!(start_only, unfiltered);
    assert_eq!(end_only, unfiltered);
}

#[test]
fn test_filter_workouts_range_is_inclusive() {
    let records = sample_history();
    let filtered = filter_workouts(
        &records,
        &ExerciseFilter::All,
        Some(date(2024, 3, 1)),
        Some(date(2024, 3, 8)),
    );
    let ids: Vec<i64> = filtered.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![3, 4, 1, 2]);

    let single_day = filter_workouts(
        &records,
        &ExerciseFilter::All,
        Some(date(2024, 3, 10)),
        Some(date(2024, 3, 10)),
    );
    assert_eq!(single_day.len(), 2);
}

#[test]
fn test_filter_workouts_by_exercise_and_range() {
    let records = sample_history();
    let filter = ExerciseFilter::Only("Bench Press".to_string());
    let filtered = filter_workouts(&records, &filter, Some(date(2024, 3, 2)), Some(date(2024, 3, 31)));
    let ids: Vec<i64> = filtered.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![6, 3]);

    // Exact match only
    let lower = ExerciseFilter::Only("bench press".to_string());
    assert!(filter_workouts(&records, &lower, None, None).is_empty());
}

#[test]
fn test_exercise_filter_parses_all_sentinel() {
    assert_eq!("All".parse::<ExerciseFilter>().unwrap(), ExerciseFilter::All);
    assert_eq!(
        "Squat".parse::<ExerciseFilter>().unwrap(),
        ExerciseFilter::Only("Squat".to_string())
    );
    assert_eq!(ExerciseFilter::All.to_string(), "All");
}

#[test]
fn test_history_query_combines_filters() {
    let records = sample_history();
    let query = HistoryQuery {
        search: Some("PRESS".to_string()),
        ..Default::default()
    };
    let ids: Vec<i64> = query.apply(&records).iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![6, 3, 1]);

    let query = HistoryQuery {
        search: Some("s".to_string()), // Squat, Bench Press
        exercise: ExerciseFilter::Only("Squat".to_string()),
        start_date: Some(date(2024, 3, 5)),
        end_date: Some(date(2024, 3, 31)),
    };
    let ids: Vec<i64> = query.apply(&records).iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![5]);
}

#[test]
fn test_distinct_exercises_sorted() {
    assert_eq!(
        distinct_exercises(&sample_history()),
        vec!["Bench Press", "Deadlift", "Squat"]
    );
}

#[test]
fn test_progress_of_empty_series() {
    let progress = compute_exercise_progress("Squat", &[]);
    assert_eq!(progress.exercise, "Squat");
    assert!(progress.series.is_empty());
    assert_eq!(progress.stats, ProgressStats::default());
    assert_eq!(progress.stats.progress_percent, 0);
}

#[test]
fn test_progress_of_single_point() {
    let progress = compute_exercise_progress("Squat", &[record(1, date(2024, 1, 1), "Squat", 50.0)]);
    assert_eq!(progress.series.len(), 1);
    assert_eq!(progress.stats.current, 50.0);
    assert_eq!(progress.stats.max, 50.0);
    assert_eq!(progress.stats.average, 50.0);
    assert_eq!(progress.stats.progress, 0.0);
    assert_eq!(progress.stats.progress_percent, 0);
}

#[test]
fn test_progress_stats() {
    // Given newest first, as the store returns them
    let records: Vec<WorkoutRecord> = [20.0, 22.0, 25.0, 24.0, 30.0]
        .iter()
        .enumerate()
        .rev()
        .map(|(i, &w)| record(i as i64 + 1, date(2024, 1, 1 + i as u32), "Bench Press", w))
        .collect();

    let progress = compute_exercise_progress("Bench Press", &records);
    let weights: Vec<f64> = progress.series.iter().map(|p| p.weight).collect();
    assert_eq!(weights, vec![20.0, 22.0, 25.0, 24.0, 30.0]);
    assert_eq!(progress.stats.average, 24.2);
    assert_eq!(progress.stats.current, 30.0);
    assert_eq!(progress.stats.max, 30.0);
    assert_eq!(progress.stats.progress, 10.0);
    assert_eq!(progress.stats.progress_percent, 50);
}

#[test]
fn test_progress_keeps_same_day_points_in_order() {
    let day = date(2024, 2, 2);
    let records = vec![
        record(3, date(2024, 2, 3), "Squat", 110.0),
        record(1, day, "Squat", 100.0),
        record(2, day, "Squat", 105.0),
    ];
    let progress = compute_exercise_progress("Squat", &records);
    let weights: Vec<f64> = progress.series.iter().map(|p| p.weight).collect();
    assert_eq!(weights, vec![100.0, 105.0, 110.0]);
    assert_eq!(progress.stats.current, 110.0);
}

#[test]
fn test_progress_regression_and_zero_start() {
    let records = vec![
        record(1, date(2024, 1, 1), "Curl", 12.5),
        record(2, date(2024, 1, 8), "Curl", 10.0),
    ];
    let stats = compute_exercise_progress("Curl", &records).stats;
    assert_eq!(stats.progress, -2.5);
    assert_eq!(stats.progress_percent, -20);
    assert_eq!(stats.average, 11.3); // 11.25 rounds away from zero

    let from_zero = vec![
        record(1, date(2024, 1, 1), "Push Up", 0.0),
        record(2, date(2024, 1, 2), "Push Up", 10.0),
    ];
    let stats = compute_exercise_progress("Push Up", &from_zero).stats;
    assert_eq!(stats.progress, 10.0);
    assert_eq!(stats.progress_percent, 0);
}

fn points(weights: &[f64]) -> Vec<ProgressPoint> {
    weights
        .iter()
        .enumerate()
        .map(|(i, &weight)| ProgressPoint {
            date: date(2024, 1, 1 + i as u32),
            weight,
        })
        .collect()
}

#[test]
fn test_bar_height_fraction_scales_into_range() {
    let series = points(&[20.0, 25.0, 30.0]);
    assert!((bar_height_fraction(20.0, &series) - 0.2).abs() < 1e-9);
    assert!((bar_height_fraction(25.0, &series) - 0.6).abs() < 1e-9);
    assert!((bar_height_fraction(30.0, &series) - 1.0).abs() < 1e-9);
}

#[test]
fn test_bar_height_fraction_flat_series() {
    let series = points(&[40.0, 40.0, 40.0]);
    let heights: Vec<f64> = series
        .iter()
        .map(|p| bar_height_fraction(p.weight, &series))
        .collect();
    assert!(heights.iter().all(|h| (0.2..=1.0).contains(h)));
    assert!(heights.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(bar_height_fraction(10.0, &[]), 0.2);
}

#[test]
fn test_recent_sessions_window() {
    let series = points(&[1.0, 2.0, 3.0, 4.0]);
    let last_two: Vec<f64> = recent_sessions(&series, 2).iter().map(|p| p.weight).collect();
    assert_eq!(last_two, vec![3.0, 4.0]);
    assert_eq!(recent_sessions(&series, 15).len(), 4);
}
