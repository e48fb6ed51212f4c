use std::collections::VecDeque;

use gloo_storage::{LocalStorage, Storage, errors::StorageError};
use serde::de::DeserializeOwned;
use workout_tracker_web_app::{
    OngoingWorkout, OngoingWorkoutRepository, Settings, SettingsRepository, log,
};

const KEY_SETTINGS: &str = "workout-tracker-settings";
const KEY_ONGOING_WORKOUT: &str = "workout-tracker-ongoing-workout";
const KEY_LOG: &str = "workout-tracker-log";

/// Small state of the web app kept in the browser's local storage.
pub struct UI;

fn read_or<T: DeserializeOwned>(key: &str, default: T) -> Result<T, StorageError> {
    match LocalStorage::get(key) {
        Ok(value) => Ok(value),
        Err(StorageError::KeyNotFound(_)) => Ok(default),
        Err(err) => Err(err),
    }
}

impl SettingsRepository for UI {
    async fn read_settings(&self) -> Result<Settings, String> {
        read_or(KEY_SETTINGS, Settings::default()).map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        LocalStorage::set(KEY_SETTINGS, settings).map_err(|err| err.to_string())
    }
}

impl OngoingWorkoutRepository for UI {
    async fn read_ongoing_workout(&self) -> Result<Option<OngoingWorkout>, String> {
        read_or(KEY_ONGOING_WORKOUT, None).map_err(|err| err.to_string())
    }

    async fn write_ongoing_workout(
        &self,
        ongoing_workout: Option<OngoingWorkout>,
    ) -> Result<(), String> {
        match ongoing_workout {
            Some(ongoing_workout) => LocalStorage::set(KEY_ONGOING_WORKOUT, ongoing_workout)
                .map_err(|err| err.to_string()),
            None => {
                LocalStorage::delete(KEY_ONGOING_WORKOUT);
                Ok(())
            }
        }
    }
}

pub struct Log;

impl log::Repository for Log {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        read_or(KEY_LOG, VecDeque::new()).map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::push_entry(&mut entries, entry);
        LocalStorage::set(KEY_LOG, entries).map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
