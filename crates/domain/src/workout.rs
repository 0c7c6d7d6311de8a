use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    DeleteError, ExerciseID, Name, ReadError, Reps, UpdateError, ValidationError, Weight,
    estimate_one_rep_max,
};

/// Format of the date keys identifying workouts.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_workouts(&self) -> Result<Vec<WorkoutRecord>, ReadError>;
    async fn replace_workout(&self, workout: WorkoutRecord) -> Result<WorkoutRecord, UpdateError>;
    async fn delete_workout(&self, date: NaiveDate) -> Result<NaiveDate, DeleteError>;
}

/// All exercises performed on a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutRecord {
    pub date: NaiveDate,
    pub entries: Vec<ExerciseEntry>,
}

impl WorkoutRecord {
    /// Best estimated one-rep max of each exercise on this day.
    ///
    /// Exercises without any set contribute an estimate of zero.
    #[must_use]
    pub fn best_estimates(&self) -> BTreeMap<ExerciseID, f32> {
        let mut result: BTreeMap<ExerciseID, f32> = BTreeMap::new();
        for entry in &self.entries {
            let best = entry.best_estimate();
            result
                .entry(entry.exercise_id)
                .and_modify(|v| *v = v.max(best))
                .or_insert(best);
        }
        result
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseEntry {
    pub exercise_id: ExerciseID,
    pub name: Name,
    pub sets: Vec<SetEntry>,
}

impl ExerciseEntry {
    #[must_use]
    pub fn best_estimate(&self) -> f32 {
        self.sets
            .iter()
            .map(|s| s.estimated_1rm)
            .fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetEntry {
    pub weight: Weight,
    pub reps: Reps,
    pub estimated_1rm: f32,
}

impl SetEntry {
    #[must_use]
    pub fn new(weight: Weight, reps: Reps) -> Self {
        Self {
            weight,
            reps,
            estimated_1rm: estimate_one_rep_max(weight, reps),
        }
    }
}

pub fn parse_date_key(date: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date.trim(), DATE_KEY_FORMAT)
}

#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Check that a workout date is well-formed and not in the future.
pub fn validate_workout_date(date: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    match parse_date_key(date) {
        Ok(parsed_date) => validate_workout_day(parsed_date, today),
        Err(_) => Err(ValidationError::Other("Invalid date".into())),
    }
}

pub fn validate_workout_day(
    date: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    if date <= today {
        Ok(date)
    } else {
        Err(ValidationError::Other("Date must not be in the future".into()))
    }
}
