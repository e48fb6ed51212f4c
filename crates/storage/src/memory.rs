use std::{cell::Cell, cmp::Ordering, collections::BTreeMap};

use chrono::Utc;
use futures_util::lock::{Mutex, MutexGuard};
use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    Backend, BackendError, Index, Snapshot, Store,
    records,
    schema::{self, DB_VERSION, StoreSchema},
};

/// Content of an in-memory database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    version: u32,
    stores: BTreeMap<Store, BTreeMap<String, Value>>,
}

impl Database {
    /// Database with the stores of all schema versions up to `version`.
    #[must_use]
    pub fn at_version(version: u32) -> Self {
        let mut database = Self::default();
        database.upgrade_to(version);
        database
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Insert a raw record, bypassing typed serialization.
    pub fn insert(&mut self, store: Store, record: Value) -> Result<(), BackendError> {
        let key = schema::record_key(store, &record)?;
        let records = self
            .stores
            .get_mut(&store)
            .ok_or(BackendError::UnknownStore(store))?;
        if records.contains_key(&key) {
            return Err(BackendError::DuplicateKey { store, key });
        }
        records.insert(key, record);
        Ok(())
    }

    fn upgrade_to(&mut self, version: u32) {
        for v in self.version + 1..=version {
            for store_schema in schema::stores_created_in(v) {
                self.stores.entry(store_schema.store).or_default();
            }
        }
        self.version = version;
    }

    fn records(&self, store: Store) -> Result<&BTreeMap<String, Value>, BackendError> {
        self.stores
            .get(&store)
            .ok_or(BackendError::UnknownStore(store))
    }

    fn records_mut(&mut self, store: Store) -> Result<&mut BTreeMap<String, Value>, BackendError> {
        self.stores
            .get_mut(&store)
            .ok_or(BackendError::UnknownStore(store))
    }

    fn backfill_workout_dates(&mut self) -> Result<usize, BackendError> {
        let now = Utc::now();
        let mut patched = 0;
        for (key, record) in self.records_mut(Store::CompletedWorkouts)? {
            let mut workout = match serde_json::from_value::<records::CompletedWorkout>(record.clone())
            {
                Ok(workout) => workout,
                Err(err) => {
                    warn!("skipping backfill of completed workout {key}: {err}");
                    continue;
                }
            };
            if schema::backfill_workout_date(&mut workout, now) {
                *record = serde_json::to_value(&workout)?;
                patched += 1;
            }
        }
        Ok(patched)
    }
}

/// Backend keeping all records in memory.
///
/// Behaves like the browser database: the schema is upgraded on first use, concurrent first
/// uses share a single upgrade. Opening also backfills the date of completed workouts lacking
/// one. The upgrade and the backfill are applied together or not at all, so a failed open is
/// retried completely on the next use.
pub struct MemoryBackend {
    database: Mutex<Database>,
    unavailable: Option<String>,
    connected: Cell<bool>,
    upgrades: Cell<u32>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::with_database(Database::default())
    }

    /// Backend opening an existing database, possibly of an older schema version.
    #[must_use]
    pub fn with_database(database: Database) -> Self {
        Self {
            database: Mutex::new(database),
            unavailable: None,
            connected: Cell::new(false),
            upgrades: Cell::new(0),
        }
    }

    /// Backend whose database cannot be opened.
    #[must_use]
    pub fn unavailable(reason: &str) -> Self {
        Self {
            unavailable: Some(reason.to_string()),
            ..Self::new()
        }
    }

    /// Number of schema upgrades performed.
    #[must_use]
    pub fn upgrades(&self) -> u32 {
        self.upgrades.get()
    }

    pub async fn database(&self) -> Result<Database, BackendError> {
        Ok(self.open().await?.clone())
    }

    async fn open(&self) -> Result<MutexGuard<'_, Database>, BackendError> {
        if let Some(reason) = &self.unavailable {
            return Err(BackendError::Unavailable(reason.clone()));
        }

        let mut database = self.database.lock().await;
        if self.connected.get() {
            return Ok(database);
        }

        let old_version = database.version;
        let mut staged = database.clone();
        if old_version < DB_VERSION {
            debug!("upgrading database from version {old_version} to {DB_VERSION}");
            staged.upgrade_to(DB_VERSION);
        }
        let patched = staged.backfill_workout_dates()?;
        if patched > 0 {
            debug!("backfilled date of {patched} completed workouts");
        }
        *database = staged;

        if old_version < DB_VERSION {
            self.upgrades.set(self.upgrades.get() + 1);
        }
        self.connected.set(true);
        Ok(database)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    async fn get_all<R: DeserializeOwned>(&self, store: Store) -> Result<Vec<R>, BackendError> {
        let database = self.open().await?;
        database
            .records(store)?
            .values()
            .map(|record| serde_json::from_value(record.clone()).map_err(BackendError::from))
            .collect()
    }

    async fn get_all_by_index<R: DeserializeOwned>(
        &self,
        store: Store,
        index: Index,
    ) -> Result<Vec<R>, BackendError> {
        if !store_schema(store).is_some_and(|s| s.indexes.contains(&index)) {
            return Err(BackendError::UnknownIndex { store, index });
        }
        let database = self.open().await?;
        let mut indexed = database
            .records(store)?
            .values()
            .filter_map(|record| {
                record
                    .get(index.as_ref())
                    .filter(|key| key.is_number() || key.is_string())
                    .map(|key| (key, record))
            })
            .collect::<Vec<_>>();
        indexed.sort_by(|(a, _), (b, _)| compare_index_keys(a, b));
        indexed
            .into_iter()
            .map(|(_, record)| serde_json::from_value(record.clone()).map_err(BackendError::from))
            .collect()
    }

    async fn get<R: DeserializeOwned>(
        &self,
        store: Store,
        key: &str,
    ) -> Result<Option<R>, BackendError> {
        let database = self.open().await?;
        database
            .records(store)?
            .get(key)
            .map(|record| serde_json::from_value(record.clone()).map_err(BackendError::from))
            .transpose()
    }

    async fn add<R: Serialize>(&self, store: Store, record: &R) -> Result<(), BackendError> {
        let mut database = self.open().await?;
        database.insert(store, serde_json::to_value(record)?)
    }

    async fn put<R: Serialize>(&self, store: Store, record: &R) -> Result<(), BackendError> {
        let record = serde_json::to_value(record)?;
        let key = schema::record_key(store, &record)?;
        let mut database = self.open().await?;
        database.records_mut(store)?.insert(key, record);
        Ok(())
    }

    async fn delete(&self, store: Store, key: &str) -> Result<(), BackendError> {
        let mut database = self.open().await?;
        database.records_mut(store)?.remove(key);
        Ok(())
    }

    async fn clear(&self, store: Store) -> Result<(), BackendError> {
        let mut database = self.open().await?;
        database.records_mut(store)?.clear();
        Ok(())
    }

    async fn replace_all(&self, snapshot: &Snapshot) -> Result<(), BackendError> {
        let mut replacements = vec![
            (Store::Exercises, to_records(Store::Exercises, &snapshot.exercises)?),
            (
                Store::WorkoutTemplates,
                to_records(Store::WorkoutTemplates, &snapshot.workout_templates)?,
            ),
            (
                Store::CompletedWorkouts,
                to_records(Store::CompletedWorkouts, &snapshot.completed_workouts)?,
            ),
        ];
        if let Some(personal_stats) = &snapshot.personal_stats {
            replacements.push((
                Store::PersonalStats,
                to_records(Store::PersonalStats, personal_stats)?,
            ));
        }

        let mut database = self.open().await?;
        for (store, records) in replacements {
            *database.records_mut(store)? = records;
        }
        Ok(())
    }
}

fn store_schema(store: Store) -> Option<&'static StoreSchema> {
    schema::upgrade_steps(0).find(|s| s.store == store)
}

fn to_records<R: Serialize>(
    store: Store,
    records: &[R],
) -> Result<BTreeMap<String, Value>, BackendError> {
    let mut result = BTreeMap::new();
    for record in records {
        let record = serde_json::to_value(record)?;
        let key = schema::record_key(store, &record)?;
        if result.contains_key(&key) {
            return Err(BackendError::DuplicateKey { store, key });
        }
        result.insert(key, record);
    }
    Ok(result)
}

/// Order of index keys: numbers before strings.
fn compare_index_keys(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Number(_), _) => Ordering::Less,
        (_, Value::Number(_)) => Ordering::Greater,
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
