use crate::{DefaultInterval, GOAL_INCREMENT, PlateError, PlateInventory, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, ReadError>;
    async fn write_settings(&self, settings: Settings) -> Result<(), UpdateError>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub bar_weight: f32,
    pub plates: Vec<f32>,
    pub goal_increment: f32,
    pub progress_window_days: u32,
}

impl Settings {
    pub fn plate_inventory(&self) -> Result<PlateInventory, PlateError> {
        PlateInventory::new(&self.plates)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.bar_weight.is_finite() || self.bar_weight < 0.0 {
            return Err(SettingsError::InvalidBarWeight(self.bar_weight));
        }

        if !self.goal_increment.is_finite() || self.goal_increment <= 0.0 {
            return Err(SettingsError::InvalidGoalIncrement(self.goal_increment));
        }

        if self.progress_window_days == 0 {
            return Err(SettingsError::InvalidProgressWindow);
        }

        self.plate_inventory()?;

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bar_weight: 20.0,
            plates: PlateInventory::default().denominations().to_vec(),
            goal_increment: GOAL_INCREMENT,
            progress_window_days: DefaultInterval::_1M.days(),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("Bar weight must not be negative ({0})")]
    InvalidBarWeight(f32),
    #[error("Goal increment must be positive ({0})")]
    InvalidGoalIncrement(f32),
    #[error("Progress window must span at least one day")]
    InvalidProgressWindow,
    #[error(transparent)]
    InvalidPlates(#[from] PlateError),
}
