use derive_more::{AsRef, Deref, Display, Into};
use uuid::Uuid;

/// Upper bound of repetitions used for estimating the one-rep max.
///
/// Estimates based on higher repetition counts become unreliable, so they are capped.
pub const MAX_ESTIMATION_REPS: u32 = 30;

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.chars().count();

        if len > 64 {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        let tenths = value * 10.0;
        if (tenths - tenths.round()).abs() > 0.01 {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.replace(',', ".").trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1 kg")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Estimate the one-rep max of a set using the Epley formula.
///
/// A single repetition is an actual one-rep max and is returned as is. Sets without weight or
/// without repetitions do not allow an estimate and result in zero.
#[must_use]
pub fn estimate_one_rep_max(weight: Weight, reps: Reps) -> f32 {
    let weight = f32::from(weight);
    let reps = u32::from(reps);

    if weight <= 0.0 || reps == 0 {
        return 0.0;
    }

    if reps == 1 {
        return weight;
    }

    #[allow(clippy::cast_precision_loss)]
    let r = reps.min(MAX_ESTIMATION_REPS) as f32;

    weight * (1.0 + r / 30.0)
}
