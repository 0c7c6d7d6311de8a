//! In-memory document store.
//!
//! Documents are kept as JSON values in named stores. The whole content can be exported as a
//! single JSON snapshot and imported again.

use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::NaiveDate;
use repmax_domain as domain;
use strum::AsRefStr;

use crate::document::{ExerciseMax, Goal, Streak, Workout};

type Documents = BTreeMap<String, serde_json::Value>;

const SETTINGS: &str = "settings";
const STREAK: &str = "streak";

pub struct MemoryStore {
    stores: Mutex<BTreeMap<String, Documents>>,
    connected: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stores: Mutex::new(BTreeMap::new()),
            connected: AtomicBool::new(true),
        }
    }

    /// While disconnected, every access fails with [`domain::StorageError::NoConnection`].
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub fn export(&self) -> Result<serde_json::Value, domain::StorageError> {
        self.access(|stores| Ok(serde_json::to_value(&*stores)?))
    }

    /// Replace the whole content by a snapshot created by [`MemoryStore::export`].
    pub fn import(&self, snapshot: serde_json::Value) -> Result<(), domain::StorageError> {
        let imported: BTreeMap<String, Documents> = serde_json::from_value(snapshot)
            .map_err(|err| domain::StorageError::Other(Box::new(err)))?;
        self.access(|stores| {
            *stores = imported;
            Ok(())
        })
    }

    pub fn get<V>(&self, store: Store, key: &str) -> Result<Option<V>, domain::StorageError>
    where
        V: for<'de> serde::Deserialize<'de>,
    {
        self.access(|stores| {
            match stores
                .get(store.as_ref())
                .and_then(|documents| documents.get(key))
            {
                Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
                None => Ok(None),
            }
        })
    }

    /// All documents of a store ordered by key.
    pub fn get_all<V>(&self, store: Store) -> Result<Vec<V>, domain::StorageError>
    where
        V: for<'de> serde::Deserialize<'de>,
    {
        self.access(|stores| {
            let mut result = vec![];
            if let Some(documents) = stores.get(store.as_ref()) {
                for value in documents.values() {
                    result.push(serde_json::from_value(value.clone())?);
                }
            }
            Ok(result)
        })
    }

    pub fn put<V: serde::Serialize>(
        &self,
        store: Store,
        key: String,
        value: &V,
    ) -> Result<(), domain::StorageError> {
        self.access(|stores| {
            let value = serde_json::to_value(value)?;
            stores
                .entry(store.as_ref().to_string())
                .or_default()
                .insert(key, value);
            Ok(())
        })
    }

    /// Returns `false` if no document with the given key exists.
    pub fn delete(&self, store: Store, key: &str) -> Result<bool, domain::StorageError> {
        self.access(|stores| {
            Ok(stores
                .get_mut(store.as_ref())
                .and_then(|documents| documents.remove(key))
                .is_some())
        })
    }

    fn access<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, Documents>) -> Result<T, Box<dyn std::error::Error>>,
    ) -> Result<T, domain::StorageError> {
        if !self.is_connected() {
            return Err(domain::StorageError::NoConnection);
        }
        let mut stores = self
            .stores
            .lock()
            .map_err(|err| domain::StorageError::Other(err.to_string().into()))?;
        f(&mut stores).map_err(domain::StorageError::Other)
    }
}

impl domain::WorkoutRepository for MemoryStore {
    async fn read_workouts(&self) -> Result<Vec<domain::WorkoutRecord>, domain::ReadError> {
        self.get_all::<Workout>(Store::Workouts)?
            .into_iter()
            .map(|workout| {
                domain::WorkoutRecord::try_from(workout)
                    .map_err(|err| domain::ReadError::Other(Box::new(err)))
            })
            .collect()
    }

    async fn replace_workout(
        &self,
        workout: domain::WorkoutRecord,
    ) -> Result<domain::WorkoutRecord, domain::UpdateError> {
        self.put(
            Store::Workouts,
            domain::date_key(workout.date),
            &Workout::from(&workout),
        )?;
        Ok(workout)
    }

    async fn delete_workout(&self, date: NaiveDate) -> Result<NaiveDate, domain::DeleteError> {
        if self.delete(Store::Workouts, &domain::date_key(date))? {
            Ok(date)
        } else {
            Err(domain::DeleteError::NotFound)
        }
    }
}

impl domain::ExerciseMaxRepository for MemoryStore {
    async fn read_exercise_max(
        &self,
        exercise_id: domain::ExerciseID,
        window_days: u32,
    ) -> Result<Option<domain::ExerciseMax>, domain::ReadError> {
        Ok(self
            .get::<ExerciseMax>(
                Store::ExerciseMax,
                &ExerciseMax::key(exercise_id, window_days),
            )?
            .map(domain::ExerciseMax::from))
    }

    async fn write_exercise_max(
        &self,
        exercise_max: domain::ExerciseMax,
    ) -> Result<domain::ExerciseMax, domain::UpdateError> {
        self.put(
            Store::ExerciseMax,
            ExerciseMax::key(exercise_max.exercise_id, exercise_max.window_days),
            &ExerciseMax::from(exercise_max),
        )?;
        Ok(exercise_max)
    }
}

impl domain::GoalRepository for MemoryStore {
    async fn read_goal(
        &self,
        exercise_id: domain::ExerciseID,
    ) -> Result<Option<domain::Goal>, domain::ReadError> {
        Ok(self
            .get::<Goal>(Store::Goals, &(*exercise_id).to_string())?
            .map(domain::Goal::from))
    }

    async fn write_goal(&self, goal: domain::Goal) -> Result<domain::Goal, domain::UpdateError> {
        self.put(
            Store::Goals,
            (*goal.exercise_id).to_string(),
            &Goal::from(goal),
        )?;
        Ok(goal)
    }
}

impl domain::StreakRepository for MemoryStore {
    async fn read_streak(&self) -> Result<Option<domain::Streak>, domain::ReadError> {
        Ok(self
            .get::<Streak>(Store::App, STREAK)?
            .map(domain::Streak::from))
    }

    async fn write_streak(
        &self,
        streak: domain::Streak,
    ) -> Result<domain::Streak, domain::UpdateError> {
        self.put(Store::App, STREAK.to_string(), &Streak::from(streak))?;
        Ok(streak)
    }
}

impl domain::SettingsRepository for MemoryStore {
    async fn read_settings(&self) -> Result<domain::Settings, domain::ReadError> {
        Ok(self
            .get::<domain::Settings>(Store::App, SETTINGS)?
            .unwrap_or_default())
    }

    async fn write_settings(&self, settings: domain::Settings) -> Result<(), domain::UpdateError> {
        Ok(self.put(Store::App, SETTINGS.to_string(), &settings)?)
    }
}

#[derive(AsRefStr, Debug, Clone, Copy)]
pub enum Store {
    #[strum(serialize = "app")]
    App,
    #[strum(serialize = "workouts")]
    Workouts,
    #[strum(serialize = "exercise_max")]
    ExerciseMax,
    #[strum(serialize = "goals")]
    Goals,
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use domain::{
        ExerciseMaxRepository, GoalRepository, SettingsRepository, StreakRepository,
        WorkoutRepository,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use uuid::Uuid;

    use crate::tests::data::{
        EXERCISE_MAX, GOAL, STREAK as STREAK_DATA, WORKOUT, WORKOUT_2, WORKOUTS,
    };

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    async fn service_with_workouts() -> domain::Service<MemoryStore> {
        let service = domain::Service::new(MemoryStore::new());
        for workout in WORKOUTS.iter() {
            service
                .save_workout(workout.clone(), workout.date)
                .await
                .unwrap();
        }
        service
    }

    #[tokio::test]
    async fn test_workouts() {
        let service = domain::Service::new(MemoryStore::new());
        let today = date(2020, 2, 3);
        assert_eq!(service.get_workouts().await.unwrap(), vec![]);

        service.save_workout(WORKOUT_2.clone(), today).await.unwrap();
        service.save_workout(WORKOUT.clone(), today).await.unwrap();
        assert_eq!(service.get_workouts().await.unwrap(), *WORKOUTS);

        let mut replaced = WORKOUT.clone();
        replaced.entries.truncate(1);
        service.save_workout(replaced.clone(), today).await.unwrap();
        assert_eq!(
            service.get_workouts().await.unwrap(),
            vec![replaced, WORKOUT_2.clone()]
        );

        assert_eq!(
            service.delete_workout(WORKOUT.date).await.unwrap(),
            WORKOUT.date
        );
        assert_eq!(
            service.get_workouts().await.unwrap(),
            vec![WORKOUT_2.clone()]
        );
    }

    #[tokio::test]
    async fn test_save_workout_in_future() {
        let service = domain::Service::new(MemoryStore::new());
        assert!(matches!(
            service.save_workout(WORKOUT_2.clone(), WORKOUT.date).await,
            Err(domain::UpdateError::Other(_))
        ));
        assert_eq!(service.get_workouts().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_delete_missing_workout() {
        let service = domain::Service::new(MemoryStore::new());
        assert!(matches!(
            service.delete_workout(WORKOUT.date).await,
            Err(domain::DeleteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_no_connection() {
        let store = MemoryStore::new();
        store.set_connected(false);
        assert!(matches!(
            store.read_workouts().await,
            Err(domain::ReadError::Storage(
                domain::StorageError::NoConnection
            ))
        ));
        assert!(matches!(
            store.write_streak(STREAK_DATA).await,
            Err(domain::UpdateError::Storage(
                domain::StorageError::NoConnection
            ))
        ));
        store.set_connected(true);
        assert_eq!(store.read_streak().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_document() {
        let store = MemoryStore::new();
        store
            .put(
                Store::Workouts,
                "2020-02-02".to_string(),
                &json!({
                    "date": "2020-02-02",
                    "exercises": [{ "id": Uuid::nil(), "name": "", "sets": [] }]
                }),
            )
            .unwrap();
        assert!(matches!(
            store.read_workouts().await,
            Err(domain::ReadError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_exercise_max_and_goal() {
        let store = MemoryStore::new();
        assert_eq!(store.read_exercise_max(1.into(), 30).await.unwrap(), None);
        store.write_exercise_max(*EXERCISE_MAX).await.unwrap();
        assert_eq!(
            store.read_exercise_max(1.into(), 30).await.unwrap(),
            Some(*EXERCISE_MAX)
        );
        assert_eq!(store.read_exercise_max(1.into(), 7).await.unwrap(), None);

        assert_eq!(store.read_goal(2.into()).await.unwrap(), None);
        store.write_goal(*GOAL).await.unwrap();
        assert_eq!(store.read_goal(2.into()).await.unwrap(), Some(*GOAL));
    }

    #[tokio::test]
    async fn test_progress() {
        let service = service_with_workouts().await;
        service
            .repository()
            .write_exercise_max(*EXERCISE_MAX)
            .await
            .unwrap();
        service.repository().write_goal(*GOAL).await.unwrap();

        let report = service.progress(date(2020, 2, 10)).await.unwrap();

        assert_eq!(
            report.interval,
            domain::Interval::trailing(date(2020, 2, 10), 30)
        );
        assert_eq!(report.progress.exercises.len(), 2);
        assert_eq!(report.progress.series[&domain::ExerciseID::from(2)].len(), 2);
        assert_approx_eq!(report.maxima[&domain::ExerciseID::from(1)].value, 121.0, 0.001);
        assert_approx_eq!(report.maxima[&domain::ExerciseID::from(2)].value, 63.333, 0.001);
        let running_max = &report.running_maxima[&domain::ExerciseID::from(2)];
        assert_eq!(
            running_max.iter().map(|(d, _)| *d).collect::<Vec<_>>(),
            vec![date(2020, 2, 2), date(2020, 2, 3)]
        );
        assert_approx_eq!(running_max[0].1, 60.0, 0.001);
        assert_approx_eq!(running_max[1].1, 63.333, 0.001);
        assert_eq!(report.running_maxima[&domain::ExerciseID::from(1)].len(), 1);
        assert_eq!(
            report.goals[&domain::ExerciseID::from(1)],
            domain::GoalEvaluation {
                goal: 122.5,
                achieved: true
            }
        );
        assert_eq!(
            report.goals[&domain::ExerciseID::from(2)],
            domain::GoalEvaluation {
                goal: 65.0,
                achieved: false
            }
        );

        let repository = service.repository();
        assert_approx_eq!(
            repository
                .read_exercise_max(1.into(), 30)
                .await
                .unwrap()
                .unwrap()
                .value,
            121.0,
            0.001
        );
        assert_approx_eq!(
            repository
                .read_exercise_max(2.into(), 30)
                .await
                .unwrap()
                .unwrap()
                .value,
            63.333,
            0.001
        );
        assert_eq!(
            repository.read_goal(1.into()).await.unwrap(),
            Some(domain::Goal {
                exercise_id: 1.into(),
                goal: 122.5,
                achieved: true
            })
        );
        assert_eq!(repository.read_goal(2.into()).await.unwrap(), Some(*GOAL));
    }

    #[tokio::test]
    async fn test_progress_keeps_higher_stored_values() {
        let service = service_with_workouts().await;
        let exercise_max = domain::ExerciseMax {
            value: 150.0,
            ..*EXERCISE_MAX
        };
        service
            .repository()
            .write_exercise_max(exercise_max)
            .await
            .unwrap();

        let report = service.progress(date(2020, 2, 10)).await.unwrap();

        assert_eq!(report.maxima[&domain::ExerciseID::from(1)], exercise_max);
        assert_eq!(
            service
                .repository()
                .read_exercise_max(1.into(), 30)
                .await
                .unwrap(),
            Some(exercise_max)
        );

        let report = service.progress(date(2020, 2, 11)).await.unwrap();

        assert_eq!(
            report.goals[&domain::ExerciseID::from(1)],
            domain::GoalEvaluation {
                goal: 152.5,
                achieved: false
            }
        );
    }

    #[tokio::test]
    async fn test_progress_outside_window() {
        let service = service_with_workouts().await;

        let report = service.progress(date(2020, 4, 1)).await.unwrap();

        assert!(report.progress.exercises.is_empty());
        assert!(report.maxima.is_empty());
        assert!(report.goals.is_empty());
        assert_eq!(
            service
                .repository()
                .read_exercise_max(1.into(), 30)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_progress_with_custom_window() {
        let service = service_with_workouts().await;
        service
            .set_settings(domain::Settings {
                progress_window_days: 7,
                ..domain::Settings::default()
            })
            .await
            .unwrap();

        let report = service.progress(date(2020, 2, 3)).await.unwrap();

        assert_eq!(report.maxima[&domain::ExerciseID::from(1)].window_days, 7);
        assert_eq!(
            service
                .repository()
                .read_exercise_max(1.into(), 30)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_progress_with_invalid_settings() {
        let service = service_with_workouts().await;
        service
            .repository()
            .write_settings(domain::Settings {
                goal_increment: 0.0,
                ..domain::Settings::default()
            })
            .await
            .unwrap();

        assert!(matches!(
            service.progress(date(2020, 2, 10)).await,
            Err(domain::UpdateError::Other(_))
        ));
        assert_eq!(service.repository().read_goal(1.into()).await.unwrap(), None);
        assert_eq!(
            service
                .repository()
                .read_exercise_max(1.into(), 30)
                .await
                .unwrap(),
            None
        );
        assert!(matches!(
            service.plates_for(70.0).await,
            Err(domain::ReadError::Other(_))
        ));
        assert!(matches!(
            service.total_for(&[1, 0, 0, 0]).await,
            Err(domain::ReadError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_progress_with_imported_invalid_settings() {
        let store = MemoryStore::new();
        store
            .import(json!({ "app": { "settings": { "goal_increment": -2.5 } } }))
            .unwrap();
        let service = domain::Service::new(store);

        assert!(service.progress(date(2020, 2, 10)).await.is_err());
        assert_eq!(
            service.get_settings().await.unwrap().goal_increment,
            -2.5
        );
    }

    #[tokio::test]
    async fn test_check_in() {
        let service = domain::Service::new(MemoryStore::new());
        let today = date(2020, 2, 4);

        assert_eq!(
            service.check_in(today).await.unwrap(),
            domain::CheckIn::Recorded(domain::Streak {
                count: 1,
                last_check_in: Some(today)
            })
        );
        assert_eq!(
            service.check_in(today).await.unwrap(),
            domain::CheckIn::AlreadyCheckedIn
        );
        assert_eq!(
            service.repository().read_streak().await.unwrap(),
            Some(domain::Streak {
                count: 1,
                last_check_in: Some(today)
            })
        );
    }

    #[tokio::test]
    async fn test_check_in_continues_streak() {
        let service = domain::Service::new(MemoryStore::new());
        service.repository().write_streak(STREAK_DATA).await.unwrap();

        assert_eq!(
            service.check_in(date(2020, 2, 4)).await.unwrap(),
            domain::CheckIn::Recorded(domain::Streak {
                count: 4,
                last_check_in: Some(date(2020, 2, 4))
            })
        );
    }

    #[tokio::test]
    async fn test_streak() {
        let service = domain::Service::new(MemoryStore::new());
        service.repository().write_streak(STREAK_DATA).await.unwrap();

        assert_eq!(service.streak(date(2020, 2, 4)).await.unwrap(), STREAK_DATA);

        let reset = domain::Streak {
            count: 0,
            last_check_in: Some(date(2020, 2, 9)),
        };
        assert_eq!(service.streak(date(2020, 2, 10)).await.unwrap(), reset);
        assert_eq!(
            service.repository().read_streak().await.unwrap(),
            Some(reset)
        );
    }

    #[tokio::test]
    async fn test_settings() {
        let service = domain::Service::new(MemoryStore::new());
        assert_eq!(
            service.get_settings().await.unwrap(),
            domain::Settings::default()
        );

        let settings = domain::Settings {
            bar_weight: 15.0,
            plates: vec![25.0, 2.5, 1.25],
            ..domain::Settings::default()
        };
        service.set_settings(settings.clone()).await.unwrap();
        assert_eq!(service.get_settings().await.unwrap(), settings);

        assert!(matches!(
            service
                .set_settings(domain::Settings {
                    goal_increment: -1.0,
                    ..domain::Settings::default()
                })
                .await,
            Err(domain::UpdateError::Other(_))
        ));
        assert_eq!(service.repository().read_settings().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_plates() {
        let service = domain::Service::new(MemoryStore::new());

        let loading = service.plates_for(70.0).await.unwrap().unwrap();
        assert_eq!(loading.plates, vec![(20.0, 1), (5.0, 1)]);
        assert_approx_eq!(loading.remainder, 0.0);
        assert_eq!(service.plates_for(-5.0).await.unwrap(), None);

        assert_eq!(service.total_for(&[2, 2, 0, 1]).await.unwrap(), Some(170.0));
        assert_eq!(service.total_for(&[-1, 0, 0, 1]).await.unwrap(), None);
        assert_eq!(service.total_for(&[1, 1]).await.unwrap(), None);

        service
            .set_settings(domain::Settings {
                bar_weight: 15.0,
                plates: vec![25.0, 2.5, 1.25],
                ..domain::Settings::default()
            })
            .await
            .unwrap();

        let loading = service.plates_for(72.5).await.unwrap().unwrap();
        assert_eq!(loading.plates, vec![(25.0, 1), (2.5, 1), (1.25, 1)]);
        assert_eq!(service.total_for(&[1, 1, 1]).await.unwrap(), Some(72.5));
    }

    #[tokio::test]
    async fn test_export_import() {
        let store = MemoryStore::new();
        for workout in WORKOUTS.iter() {
            store.replace_workout(workout.clone()).await.unwrap();
        }
        store.write_streak(STREAK_DATA).await.unwrap();

        let snapshot = store.export().unwrap();
        assert_eq!(
            snapshot["app"]["streak"],
            json!({ "count": 3, "last_check_in": "2020-02-03" })
        );
        assert_eq!(snapshot["workouts"]["2020-02-03"]["date"], json!("2020-02-03"));

        let imported = MemoryStore::new();
        imported.import(snapshot).unwrap();
        assert_eq!(imported.read_workouts().await.unwrap(), *WORKOUTS);
        assert_eq!(imported.read_streak().await.unwrap(), Some(STREAK_DATA));

        assert!(imported.import(json!([1, 2, 3])).is_err());
        assert_eq!(imported.read_workouts().await.unwrap(), *WORKOUTS);
    }

    #[test]
    fn test_store_names() {
        assert_eq!(Store::App.as_ref(), "app");
        assert_eq!(Store::ExerciseMax.as_ref(), "exercise_max");
    }
}
