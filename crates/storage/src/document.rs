//! Records as they are stored in the document store.

use chrono::NaiveDate;
use repmax_domain as domain;
use uuid::Uuid;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Workout {
    pub date: NaiveDate,
    pub exercises: Vec<Exercise>,
}

impl From<&domain::WorkoutRecord> for Workout {
    fn from(value: &domain::WorkoutRecord) -> Self {
        Self {
            date: value.date,
            exercises: value.entries.iter().map(Exercise::from).collect(),
        }
    }
}

impl From<domain::WorkoutRecord> for Workout {
    fn from(value: domain::WorkoutRecord) -> Self {
        Self::from(&value)
    }
}

impl TryFrom<Workout> for domain::WorkoutRecord {
    type Error = WorkoutError;

    fn try_from(value: Workout) -> Result<Self, Self::Error> {
        Ok(Self {
            date: value.date,
            entries: value
                .exercises
                .into_iter()
                .map(domain::ExerciseEntry::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub sets: Vec<Set>,
}

impl From<&domain::ExerciseEntry> for Exercise {
    fn from(value: &domain::ExerciseEntry) -> Self {
        Self {
            id: *value.exercise_id,
            name: value.name.to_string(),
            sets: value.sets.iter().map(Set::from).collect(),
        }
    }
}

impl TryFrom<Exercise> for domain::ExerciseEntry {
    type Error = WorkoutError;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        Ok(Self {
            exercise_id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            sets: value
                .sets
                .into_iter()
                .map(domain::SetEntry::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Set {
    pub weight: f32,
    pub reps: u32,
    pub estimated_1rm: f32,
}

impl From<&domain::SetEntry> for Set {
    fn from(value: &domain::SetEntry) -> Self {
        Self {
            weight: f32::from(value.weight),
            reps: u32::from(value.reps),
            estimated_1rm: value.estimated_1rm,
        }
    }
}

impl TryFrom<Set> for domain::SetEntry {
    type Error = WorkoutError;

    fn try_from(value: Set) -> Result<Self, Self::Error> {
        Ok(Self {
            weight: domain::Weight::new(value.weight)?,
            reps: domain::Reps::new(value.reps)?,
            estimated_1rm: value.estimated_1rm,
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WorkoutError {
    #[error(transparent)]
    InvalidName(#[from] domain::NameError),
    #[error(transparent)]
    InvalidWeight(#[from] domain::WeightError),
    #[error(transparent)]
    InvalidReps(#[from] domain::RepsError),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ExerciseMax {
    pub exercise_id: Uuid,
    pub window_days: u32,
    pub value: f32,
}

impl ExerciseMax {
    #[must_use]
    pub fn key(exercise_id: domain::ExerciseID, window_days: u32) -> String {
        format!("{}_{window_days}", *exercise_id)
    }
}

impl From<domain::ExerciseMax> for ExerciseMax {
    fn from(value: domain::ExerciseMax) -> Self {
        Self {
            exercise_id: *value.exercise_id,
            window_days: value.window_days,
            value: value.value,
        }
    }
}

impl From<ExerciseMax> for domain::ExerciseMax {
    fn from(value: ExerciseMax) -> Self {
        Self {
            exercise_id: value.exercise_id.into(),
            window_days: value.window_days,
            value: value.value,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub exercise_id: Uuid,
    pub goal: f32,
    pub achieved: bool,
}

impl From<domain::Goal> for Goal {
    fn from(value: domain::Goal) -> Self {
        Self {
            exercise_id: *value.exercise_id,
            goal: value.goal,
            achieved: value.achieved,
        }
    }
}

impl From<Goal> for domain::Goal {
    fn from(value: Goal) -> Self {
        Self {
            exercise_id: value.exercise_id.into(),
            goal: value.goal,
            achieved: value.achieved,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub count: u32,
    pub last_check_in: Option<NaiveDate>,
}

impl From<domain::Streak> for Streak {
    fn from(value: domain::Streak) -> Self {
        Self {
            count: value.count,
            last_check_in: value.last_check_in,
        }
    }
}

impl From<Streak> for domain::Streak {
    fn from(value: Streak) -> Self {
        Self {
            count: value.count,
            last_check_in: value.last_check_in,
        }
    }
}
