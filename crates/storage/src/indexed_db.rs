use std::{error::Error, fmt::Display};

use chrono::Utc;
use futures_util::lock::{MappedMutexGuard, Mutex, MutexGuard};
use indexed_db_futures::{
    KeyPath,
    database::Database,
    error::OpenDbError,
    prelude::*,
    transaction::{Transaction, TransactionMode},
};
use log::{debug, warn};
use serde::{
    Serialize,
    de::{DeserializeOwned, IgnoredAny},
};

use crate::{
    Backend, BackendError, Index, Snapshot, Store, records,
    schema::{self, DB_NAME, DB_VERSION},
};

/// Backend storing records in the browser's IndexedDB.
///
/// The connection is opened on first use and kept until the backend is dropped. All operations
/// are serialized on the connection. Every new connection backfills the date of completed
/// workouts lacking one, so an interrupted upgrade is completed on the next open.
pub struct IndexedDB {
    name: String,
    connection: Mutex<Option<Database>>,
}

impl IndexedDB {
    #[must_use]
    pub fn new() -> Self {
        Self::with_name(DB_NAME)
    }

    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            connection: Mutex::new(None),
        }
    }

    async fn connection(
        &self,
    ) -> Result<MappedMutexGuard<'_, Option<Database>, Database>, BackendError> {
        let mut slot = self.connection.lock().await;
        let db = match slot.take() {
            Some(db) => db,
            None => self.open().await?,
        };
        Ok(MutexGuard::map(slot, |slot| slot.insert(db)))
    }

    async fn open(&self) -> Result<Database, BackendError> {
        let db = open_database(&self.name)
            .await
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;
        backfill_workout_dates(&db).await.map_err(engine_error)?;
        Ok(db)
    }
}

impl Default for IndexedDB {
    fn default() -> Self {
        Self::new()
    }
}

async fn open_database(name: &str) -> Result<Database, OpenDbError> {
    Database::open(name)
        .with_version(DB_VERSION)
        .with_on_blocked(|event| {
            debug!("upgrade of database blocked: {event:?}");
            Ok(())
        })
        .with_on_upgrade_needed(move |event, db| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let old_version = event.old_version() as u32;
            debug!("upgrading database from version {old_version} to {DB_VERSION}");
            for step in schema::upgrade_steps(old_version) {
                let store = db
                    .create_object_store(step.store.as_ref())
                    .with_key_path(KeyPath::One(step.key_path))
                    .build()?;
                for index in step.indexes {
                    store
                        .create_index(index.as_ref(), KeyPath::One(index.as_ref()))
                        .build()?;
                }
            }
            Ok(())
        })
        .await
}

/// Set the date of completed workouts written before dates were recorded.
async fn backfill_workout_dates(db: &Database) -> Result<(), Box<dyn Error>> {
    let now = Utc::now();
    let transaction = db
        .transaction(Store::CompletedWorkouts.as_ref())
        .with_mode(TransactionMode::Readwrite)
        .build()?;
    let store = transaction.object_store(Store::CompletedWorkouts.as_ref())?;
    let mut patched = 0;
    for workout in store.get_all().serde()?.await? {
        let mut workout: records::CompletedWorkout = match workout {
            Ok(workout) => workout,
            Err(err) => {
                warn!("skipping backfill of completed workout: {err}");
                continue;
            }
        };
        if schema::backfill_workout_date(&mut workout, now) {
            store.put(&workout).serde()?.await?;
            patched += 1;
        }
    }
    transaction.commit().await?;
    if patched > 0 {
        debug!("backfilled date of {patched} completed workouts");
    }
    Ok(())
}

fn engine_error(err: impl Display) -> BackendError {
    BackendError::Other(anyhow::anyhow!("{err}"))
}

impl Backend for IndexedDB {
    async fn get_all<R: DeserializeOwned>(&self, store: Store) -> Result<Vec<R>, BackendError> {
        let db = self.connection().await?;
        async {
            let transaction = db
                .transaction(store.as_ref())
                .with_mode(TransactionMode::Readonly)
                .build()?;
            let object_store = transaction.object_store(store.as_ref())?;
            let mut records = vec![];
            for record in object_store.get_all().serde()?.await? {
                records.push(record?);
            }
            Ok(records)
        }
        .await
        .map_err(|err: Box<dyn Error>| engine_error(err))
    }

    async fn get_all_by_index<R: DeserializeOwned>(
        &self,
        store: Store,
        index: Index,
    ) -> Result<Vec<R>, BackendError> {
        let db = self.connection().await?;
        async {
            let transaction = db
                .transaction(store.as_ref())
                .with_mode(TransactionMode::Readonly)
                .build()?;
            let object_store = transaction.object_store(store.as_ref())?;
            let index = object_store.index(index.as_ref())?;
            let mut records = vec![];
            for record in index.get_all().serde()?.await? {
                records.push(record?);
            }
            Ok(records)
        }
        .await
        .map_err(|err: Box<dyn Error>| engine_error(err))
    }

    async fn get<R: DeserializeOwned>(
        &self,
        store: Store,
        key: &str,
    ) -> Result<Option<R>, BackendError> {
        let db = self.connection().await?;
        async {
            let transaction = db
                .transaction(store.as_ref())
                .with_mode(TransactionMode::Readonly)
                .build()?;
            let object_store = transaction.object_store(store.as_ref())?;
            Ok(object_store.get(key).serde()?.await?)
        }
        .await
        .map_err(|err: Box<dyn Error>| engine_error(err))
    }

    async fn add<R: Serialize>(&self, store: Store, record: &R) -> Result<(), BackendError> {
        let key = schema::record_key(store, &serde_json::to_value(record)?)?;
        let db = self.connection().await?;
        let added = async {
            let transaction = db
                .transaction(store.as_ref())
                .with_mode(TransactionMode::Readwrite)
                .build()?;
            let object_store = transaction.object_store(store.as_ref())?;
            let existing: Option<IgnoredAny> =
                object_store.get(key.as_str()).serde()?.await?;
            if existing.is_some() {
                return Ok(false);
            }
            object_store.add(record).serde()?.await?;
            transaction.commit().await?;
            Ok(true)
        }
        .await
        .map_err(|err: Box<dyn Error>| engine_error(err))?;
        if added {
            Ok(())
        } else {
            Err(BackendError::DuplicateKey { store, key })
        }
    }

    async fn put<R: Serialize>(&self, store: Store, record: &R) -> Result<(), BackendError> {
        schema::record_key(store, &serde_json::to_value(record)?)?;
        let db = self.connection().await?;
        async {
            let transaction = db
                .transaction(store.as_ref())
                .with_mode(TransactionMode::Readwrite)
                .build()?;
            let object_store = transaction.object_store(store.as_ref())?;
            object_store.put(record).serde()?.await?;
            transaction.commit().await?;
            Ok(())
        }
        .await
        .map_err(|err: Box<dyn Error>| engine_error(err))
    }

    async fn delete(&self, store: Store, key: &str) -> Result<(), BackendError> {
        let db = self.connection().await?;
        async {
            let transaction = db
                .transaction(store.as_ref())
                .with_mode(TransactionMode::Readwrite)
                .build()?;
            let object_store = transaction.object_store(store.as_ref())?;
            object_store.delete(key).serde()?.await?;
            transaction.commit().await?;
            Ok(())
        }
        .await
        .map_err(|err: Box<dyn Error>| engine_error(err))
    }

    async fn clear(&self, store: Store) -> Result<(), BackendError> {
        let db = self.connection().await?;
        async {
            let transaction = db
                .transaction(store.as_ref())
                .with_mode(TransactionMode::Readwrite)
                .build()?;
            transaction.object_store(store.as_ref())?.clear()?.await?;
            transaction.commit().await?;
            Ok(())
        }
        .await
        .map_err(|err: Box<dyn Error>| engine_error(err))
    }

    async fn replace_all(&self, snapshot: &Snapshot) -> Result<(), BackendError> {
        let mut stores = vec![
            Store::Exercises,
            Store::WorkoutTemplates,
            Store::CompletedWorkouts,
        ];
        if snapshot.personal_stats.is_some() {
            stores.push(Store::PersonalStats);
        }
        let db = self.connection().await?;
        async {
            let transaction = db
                .transaction(stores.iter().map(AsRef::as_ref).collect::<Vec<&str>>())
                .with_mode(TransactionMode::Readwrite)
                .build()?;
            clear_and_insert(&transaction, Store::Exercises, &snapshot.exercises).await?;
            clear_and_insert(
                &transaction,
                Store::WorkoutTemplates,
                &snapshot.workout_templates,
            )
            .await?;
            clear_and_insert(
                &transaction,
                Store::CompletedWorkouts,
                &snapshot.completed_workouts,
            )
            .await?;
            if let Some(personal_stats) = &snapshot.personal_stats {
                clear_and_insert(&transaction, Store::PersonalStats, personal_stats).await?;
            }
            transaction.commit().await?;
            Ok(())
        }
        .await
        .map_err(|err: Box<dyn Error>| engine_error(err))
    }
}

/// Replace the content of a store within a transaction that is committed by the caller.
async fn clear_and_insert<R: Serialize>(
    transaction: &Transaction<'_>,
    store: Store,
    records: &[R],
) -> Result<(), Box<dyn Error>> {
    let object_store = transaction.object_store(store.as_ref())?;
    object_store.clear()?.await?;
    for record in records {
        object_store.add(record).serde()?.await?;
    }
    Ok(())
}
