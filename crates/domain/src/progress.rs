//! Progress Aggregator
//!
//! Per-exercise estimated one-rep max (1RM) series within a time window, monotonic stored maxima
//! and goal progression.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{ExerciseID, Interval, Name, ReadError, UpdateError, WorkoutRecord};

/// Step size in kg between consecutive goals.
pub const GOAL_INCREMENT: f32 = 2.5;

#[allow(async_fn_in_trait)]
pub trait ExerciseMaxRepository {
    async fn read_exercise_max(
        &self,
        exercise_id: ExerciseID,
        window_days: u32,
    ) -> Result<Option<ExerciseMax>, ReadError>;
    async fn write_exercise_max(
        &self,
        exercise_max: ExerciseMax,
    ) -> Result<ExerciseMax, UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait GoalRepository {
    async fn read_goal(&self, exercise_id: ExerciseID) -> Result<Option<Goal>, ReadError>;
    async fn write_goal(&self, goal: Goal) -> Result<Goal, UpdateError>;
}

/// Exercises and their estimated 1RM series observed within a window.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Progress {
    pub exercises: BTreeMap<ExerciseID, Name>,
    pub series: BTreeMap<ExerciseID, Vec<(NaiveDate, f32)>>,
}

impl Progress {
    /// Highest value in the series of an exercise.
    #[must_use]
    pub fn max(&self, exercise_id: ExerciseID) -> Option<f32> {
        self.series
            .get(&exercise_id)?
            .iter()
            .map(|(_, value)| *value)
            .reduce(f32::max)
    }

    #[must_use]
    pub fn maxima(&self) -> BTreeMap<ExerciseID, f32> {
        self.series
            .keys()
            .filter_map(|id| Some((*id, self.max(*id)?)))
            .collect()
    }
}

/// Collect the exercise catalogue and the daily best estimated 1RM of each exercise.
///
/// Only records with a date inside `interval` are considered. The first name seen for an
/// exercise is kept. Days on which the best estimate of an exercise is not positive do not
/// contribute a point, so the series are sparse. Series are sorted by date.
#[must_use]
pub fn extract_window(records: &[WorkoutRecord], interval: &Interval) -> Progress {
    let mut sorted = records
        .iter()
        .filter(|r| interval.contains(r.date))
        .collect::<Vec<_>>();
    sorted.sort_by_key(|r| r.date);

    let mut progress = Progress::default();

    for record in sorted {
        for entry in &record.entries {
            progress
                .exercises
                .entry(entry.exercise_id)
                .or_insert_with(|| entry.name.clone());
        }

        for (exercise_id, best) in record.best_estimates() {
            if best > 0.0 {
                progress
                    .series
                    .entry(exercise_id)
                    .or_default()
                    .push((record.date, best));
            }
        }
    }

    progress
}

/// Merge an observed maximum into a stored maximum.
#[must_use]
pub fn update_exercise_max(stored: f32, observed: f32) -> f32 {
    stored.max(observed)
}

/// Best estimated 1RM of an exercise within a trailing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseMax {
    pub exercise_id: ExerciseID,
    pub window_days: u32,
    pub value: f32,
}

impl ExerciseMax {
    #[must_use]
    pub fn new(exercise_id: ExerciseID, window_days: u32) -> Self {
        Self {
            exercise_id,
            window_days,
            value: 0.0,
        }
    }

    /// Raise the stored value to `observed` if it is strictly greater.
    ///
    /// Returns `true` if the value changed and needs to be persisted.
    pub fn update(&mut self, observed: f32) -> bool {
        let value = update_exercise_max(self.value, observed);
        if value > self.value {
            self.value = value;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub exercise_id: ExerciseID,
    pub goal: f32,
    pub achieved: bool,
}

impl Goal {
    #[must_use]
    pub fn new(exercise_id: ExerciseID) -> Self {
        Self {
            exercise_id,
            goal: 0.0,
            achieved: false,
        }
    }

    /// Evaluate the goal against the current maximum.
    ///
    /// Returns the goal to persist if it was reached, `None` otherwise.
    #[must_use]
    pub fn evaluate(&self, current_max: f32, increment: f32) -> Option<Goal> {
        let evaluation = evaluate_goal(current_max, self.goal, increment);
        if evaluation.achieved {
            Some(Goal {
                exercise_id: self.exercise_id,
                goal: evaluation.goal,
                achieved: true,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalEvaluation {
    pub goal: f32,
    pub achieved: bool,
}

/// Check whether `stored_goal` is reached and determine the next goal.
///
/// A reached goal is replaced by the smallest multiple of `increment` strictly greater than
/// `current_max`. A stored goal of zero is always reached.
///
/// Without a positive, finite `increment` no next goal exists and the stored goal is kept.
#[must_use]
pub fn evaluate_goal(current_max: f32, stored_goal: f32, increment: f32) -> GoalEvaluation {
    if increment.is_finite() && increment > 0.0 && current_max >= stored_goal {
        GoalEvaluation {
            goal: ((current_max / increment).floor() + 1.0) * increment,
            achieved: true,
        }
    } else {
        GoalEvaluation {
            goal: stored_goal,
            achieved: false,
        }
    }
}
