use chrono::NaiveDate;

use crate::{ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait StreakRepository {
    async fn read_streak(&self) -> Result<Option<Streak>, ReadError>;
    async fn write_streak(&self, streak: Streak) -> Result<Streak, UpdateError>;
}

/// Consecutive days with a daily check-in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub count: u32,
    pub last_check_in: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakState {
    /// The streak is intact, but there was no check-in today yet.
    NoCheckinYet,
    CheckedInToday,
    /// The last check-in is more than one day ago or there was none at all.
    StreakBroken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckIn {
    Recorded(Streak),
    AlreadyCheckedIn,
}

impl Streak {
    #[must_use]
    pub fn state(&self, today: NaiveDate) -> StreakState {
        match self.last_check_in {
            Some(date) if date == today => StreakState::CheckedInToday,
            Some(date) if Some(date) == today.pred_opt() => StreakState::NoCheckinYet,
            _ => StreakState::StreakBroken,
        }
    }

    /// Reset a broken streak.
    ///
    /// The count is set to zero and the last check-in is moved to yesterday, also if there was no
    /// check-in before. An intact streak is returned unchanged.
    #[must_use]
    pub fn refresh(&self, today: NaiveDate) -> Streak {
        match self.state(today) {
            StreakState::StreakBroken => Streak {
                count: 0,
                last_check_in: today.pred_opt(),
            },
            StreakState::NoCheckinYet | StreakState::CheckedInToday => *self,
        }
    }

    /// Record the check-in of `today`.
    ///
    /// Only one check-in per day is counted. A repeated check-in leaves the streak unchanged.
    #[must_use]
    pub fn check_in(&self, today: NaiveDate) -> CheckIn {
        let streak = self.refresh(today);
        match streak.state(today) {
            StreakState::CheckedInToday => CheckIn::AlreadyCheckedIn,
            StreakState::NoCheckinYet | StreakState::StreakBroken => CheckIn::Recorded(Streak {
                count: streak.count + 1,
                last_check_in: Some(today),
            }),
        }
    }
}
