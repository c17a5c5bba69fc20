//src/export.rs
use crate::aggregate::ProgressPoint;
use crate::db::WorkoutRecord;
use std::io::{self, Write};

pub const HISTORY_CSV_HEADER: &str = "Date,Exercise,Sets,Reps,Weight (kg)";

/// Writes the raw record set as CSV, one row per record.
///
/// The exercise column is always quoted; the other columns are dates and
/// numbers and never need quoting. The `csv` crate applies one quote style to
/// every field, so rows are written directly.
pub fn write_history_csv<W: Write>(records: &[WorkoutRecord], mut writer: W) -> io::Result<()> {
    writeln!(writer, "{HISTORY_CSV_HEADER}")?;
    for record in records {
        writeln!(
            writer,
            "{},\"{}\",{},{},{}",
            record.date.format("%Y-%m-%d"),
            record.exercise.replace('"', "\"\""),
            record.sets,
            record.reps,
            record.weight
        )?;
    }
    writer.flush()
}

/// Writes a progress series as `Date,Weight (kg)` rows.
pub fn write_progress_csv<W: Write>(series: &[ProgressPoint], writer: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["Date", "Weight (kg)"])?;
    for point in series {
        writer.write_record(&[point.date.format("%Y-%m-%d").to_string(), point.weight.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
