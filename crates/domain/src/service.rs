use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, error};

use crate::{
    CheckIn, DeleteError, ExerciseID, ExerciseMax, ExerciseMaxRepository, Goal, GoalEvaluation,
    GoalRepository, Interval, Loading, Progress, ReadError, Settings, SettingsRepository, Streak,
    StreakRepository, UpdateError, WorkoutRecord, WorkoutRepository, evaluate_goal,
    extract_window, running_max, validate_workout_day,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

/// Result of aggregating the workouts within the configured progress window.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub interval: Interval,
    pub progress: Progress,
    /// Running maximum of each series, one point per day of the series.
    pub running_maxima: BTreeMap<ExerciseID, Vec<(NaiveDate, f32)>>,
    pub maxima: BTreeMap<ExerciseID, ExerciseMax>,
    pub goals: BTreeMap<ExerciseID, GoalEvaluation>,
}

impl<R: SettingsRepository> Service<R> {
    pub async fn get_settings(&self) -> Result<Settings, ReadError> {
        log_on_error!(
            self.repository.read_settings(),
            ReadError,
            "get",
            "settings"
        )
    }

    pub async fn set_settings(&self, settings: Settings) -> Result<(), UpdateError> {
        if let Err(err) = settings.validate() {
            error!("failed to set settings: {err}");
            return Err(UpdateError::Other(err.into()));
        }
        log_on_error!(
            self.repository.write_settings(settings),
            UpdateError,
            "set",
            "settings"
        )
    }

    /// Plates per side to load the configured bar to `target_weight`.
    ///
    /// Returns `None` for a negative target weight.
    pub async fn plates_for(&self, target_weight: f32) -> Result<Option<Loading>, ReadError> {
        let settings = self.get_valid_settings().await?;
        let inventory = settings
            .plate_inventory()
            .map_err(|err| ReadError::Other(err.into()))?;
        Ok(inventory.load(settings.bar_weight, target_weight))
    }

    /// Total weight of the configured bar with `counts` plates of each configured plate weight
    /// per side.
    ///
    /// Returns `None` for negative counts or if the counts do not match the configured plates.
    pub async fn total_for(&self, counts: &[i32]) -> Result<Option<f32>, ReadError> {
        let settings = self.get_valid_settings().await?;
        let inventory = settings
            .plate_inventory()
            .map_err(|err| ReadError::Other(err.into()))?;
        Ok(inventory.total(settings.bar_weight, counts))
    }

    /// Stored settings, rejected if they are invalid.
    async fn get_valid_settings(&self) -> Result<Settings, ReadError> {
        let settings = self.get_settings().await?;
        if let Err(err) = settings.validate() {
            error!("invalid settings: {err}");
            return Err(ReadError::Other(err.into()));
        }
        Ok(settings)
    }
}

impl<R: WorkoutRepository> Service<R> {
    pub async fn get_workouts(&self) -> Result<Vec<WorkoutRecord>, ReadError> {
        log_on_error!(
            self.repository.read_workouts(),
            ReadError,
            "get",
            "workouts"
        )
    }

    /// Store the workout of a day, replacing any workout of the same day.
    ///
    /// Workouts dated after `today` are rejected.
    pub async fn save_workout(
        &self,
        workout: WorkoutRecord,
        today: NaiveDate,
    ) -> Result<WorkoutRecord, UpdateError> {
        if let Err(err) = validate_workout_day(workout.date, today) {
            error!("failed to save workout: {err}");
            return Err(UpdateError::Other(err.into()));
        }
        log_on_error!(
            self.repository.replace_workout(workout),
            UpdateError,
            "save",
            "workout"
        )
    }

    pub async fn delete_workout(&self, date: NaiveDate) -> Result<NaiveDate, DeleteError> {
        log_on_error!(
            self.repository.delete_workout(date),
            DeleteError,
            "delete",
            "workout"
        )
    }
}

impl<R> Service<R>
where
    R: WorkoutRepository + ExerciseMaxRepository + GoalRepository + SettingsRepository,
{
    /// Aggregate the workouts of the trailing progress window ending `today`.
    ///
    /// Stored maxima are raised to the window maxima and reached goals are advanced. Only changed
    /// values are written.
    pub async fn progress(&self, today: NaiveDate) -> Result<ProgressReport, UpdateError> {
        let settings = self.get_valid_settings().await?;
        let workouts = self.get_workouts().await?;
        let window_days = settings.progress_window_days;
        let interval = Interval::trailing(today, window_days);
        let progress = extract_window(&workouts, &interval);
        let running_maxima = progress
            .series
            .iter()
            .map(|(exercise_id, series)| (*exercise_id, running_max(series)))
            .collect();

        let mut maxima = BTreeMap::new();
        let mut goals = BTreeMap::new();

        for (exercise_id, observed) in progress.maxima() {
            let mut exercise_max = log_on_error!(
                self.repository.read_exercise_max(exercise_id, window_days),
                ReadError,
                "get",
                "exercise max"
            )?
            .unwrap_or_else(|| ExerciseMax::new(exercise_id, window_days));

            if exercise_max.update(observed) {
                debug!(
                    "new {window_days} day max of {}: {}",
                    *exercise_id, exercise_max.value
                );
                log_on_error!(
                    self.repository.write_exercise_max(exercise_max),
                    UpdateError,
                    "write",
                    "exercise max"
                )?;
            }

            let goal = log_on_error!(
                self.repository.read_goal(exercise_id),
                ReadError,
                "get",
                "goal"
            )?
            .unwrap_or_else(|| Goal::new(exercise_id));

            let evaluation = evaluate_goal(exercise_max.value, goal.goal, settings.goal_increment);

            if evaluation.achieved {
                debug!(
                    "goal of {} reached, next goal: {}",
                    *exercise_id, evaluation.goal
                );
                log_on_error!(
                    self.repository.write_goal(Goal {
                        exercise_id,
                        goal: evaluation.goal,
                        achieved: true,
                    }),
                    UpdateError,
                    "write",
                    "goal"
                )?;
            }

            maxima.insert(exercise_id, exercise_max);
            goals.insert(exercise_id, evaluation);
        }

        Ok(ProgressReport {
            interval,
            progress,
            running_maxima,
            maxima,
            goals,
        })
    }
}

impl<R: StreakRepository> Service<R> {
    /// Current streak, reset if it is broken as of `today`.
    pub async fn streak(&self, today: NaiveDate) -> Result<Streak, UpdateError> {
        let streak = self.read_streak().await?;
        let refreshed = streak.refresh(today);

        if refreshed != streak {
            debug!("streak of {} days broken", streak.count);
            log_on_error!(
                self.repository.write_streak(refreshed),
                UpdateError,
                "write",
                "streak"
            )?;
        }

        Ok(refreshed)
    }

    pub async fn check_in(&self, today: NaiveDate) -> Result<CheckIn, UpdateError> {
        let check_in = self.read_streak().await?.check_in(today);

        if let CheckIn::Recorded(streak) = check_in {
            log_on_error!(
                self.repository.write_streak(streak),
                UpdateError,
                "write",
                "streak"
            )?;
        }

        Ok(check_in)
    }

    async fn read_streak(&self) -> Result<Streak, ReadError> {
        Ok(log_on_error!(
            self.repository.read_streak(),
            ReadError,
            "get",
            "streak"
        )?
        .unwrap_or_default())
    }
}
