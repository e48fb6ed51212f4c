use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{BackendError, Index, Store, records};

pub const DB_NAME: &str = "workout-tracker";
pub const DB_VERSION: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSchema {
    pub store: Store,
    pub key_path: &'static str,
    pub indexes: &'static [Index],
}

const VERSION_1: &[StoreSchema] = &[
    StoreSchema {
        store: Store::Exercises,
        key_path: "id",
        indexes: &[Index::Name, Index::Category],
    },
    StoreSchema {
        store: Store::WorkoutTemplates,
        key_path: "id",
        indexes: &[],
    },
    StoreSchema {
        store: Store::CompletedWorkouts,
        key_path: "id",
        indexes: &[Index::Date],
    },
];

const VERSION_2: &[StoreSchema] = &[StoreSchema {
    store: Store::PersonalStats,
    key_path: "id",
    indexes: &[Index::Date],
}];

const VERSION_3: &[StoreSchema] = &[
    StoreSchema {
        store: Store::Users,
        key_path: "email",
        indexes: &[],
    },
    StoreSchema {
        store: Store::Sessions,
        key_path: "token",
        indexes: &[],
    },
];

/// Stores created by the upgrade to `version`.
#[must_use]
pub fn stores_created_in(version: u32) -> &'static [StoreSchema] {
    match version {
        1 => VERSION_1,
        2 => VERSION_2,
        3 => VERSION_3,
        _ => &[],
    }
}

/// Stores to create when upgrading a database from `old_version` to the current version.
pub fn upgrade_steps(old_version: u32) -> impl Iterator<Item = &'static StoreSchema> {
    (old_version + 1..=DB_VERSION).flat_map(|version| stores_created_in(version).iter())
}

#[must_use]
pub fn key_path(store: Store) -> &'static str {
    match store {
        Store::Users => "email",
        Store::Sessions => "token",
        Store::Exercises
        | Store::WorkoutTemplates
        | Store::CompletedWorkouts
        | Store::PersonalStats => "id",
    }
}

/// Primary key of a serialized record.
pub fn record_key(store: Store, record: &Value) -> Result<String, BackendError> {
    let key_path = key_path(store);
    match record.get(key_path) {
        Some(Value::String(key)) => Ok(key.clone()),
        _ => Err(BackendError::MissingKey { store, key_path }),
    }
}

/// Set the date of a workout that has none. Returns whether the record was changed.
///
/// Workouts written before schema version 3 have no date. The backends apply this on every
/// open, which also completes an upgrade that was interrupted before the backfill.
pub fn backfill_workout_date(workout: &mut records::CompletedWorkout, now: DateTime<Utc>) -> bool {
    if workout.date.is_some() {
        return false;
    }
    workout.date = Some(now);
    true
}
