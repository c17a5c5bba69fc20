//src/catalog.rs
use crate::aggregate::ExerciseFilter;
use crate::Error;
use std::collections::BTreeSet;

/// Normalizes an exercise name to title case.
///
/// Surrounding whitespace is trimmed and runs of spaces collapse to one, so
/// `"  bench  press "` becomes `"Bench Press"`.
///
/// # Errors
/// Returns `Error::Validation` if nothing is left after trimming.
pub fn normalize_exercise_name(name: &str) -> Result<String, Error> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("empty exercise name".to_string()));
    }

    let words: Vec<String> = trimmed
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(title_case_word)
        .collect();
    Ok(words.join(" "))
}

/// Parses a user-supplied exercise filter. `"All"` selects every exercise;
/// anything else is normalized like a stored name.
///
/// # Errors
/// Returns `Error::Validation` if the name is blank.
pub fn parse_exercise_filter(raw: &str) -> Result<ExerciseFilter, Error> {
    match raw.parse::<ExerciseFilter>() {
        Ok(ExerciseFilter::Only(name)) => normalize_exercise_name(&name).map(ExerciseFilter::Only),
        Ok(filter) => Ok(filter),
        Err(never) => match never {},
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Catalog entries sorted ascending, duplicates removed.
#[must_use]
pub fn sorted_catalog(names: Vec<String>) -> Vec<String> {
    names.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Exact (case-sensitive) membership test against normalized names.
#[must_use]
pub fn contains(catalog: &[String], normalized: &str) -> bool {
    catalog.iter().any(|name| name == normalized)
}

/// Names from `candidates` that the catalog does not have yet, sorted.
#[must_use]
pub fn missing_names(catalog: &[String], candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .filter(|name| !contains(catalog, name))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
