#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use serde::{Serialize, de::DeserializeOwned};
use strum::{AsRefStr, EnumIter};
use workout_tracker_domain as domain;

pub mod backup;
#[cfg(target_arch = "wasm32")]
pub mod indexed_db;
#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
pub mod memory;
pub mod records;
mod repository;
pub mod schema;


/// Object stores of the local database.
#[derive(AsRefStr, EnumIter, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Store {
    #[strum(serialize = "exercises")]
    Exercises,
    #[strum(serialize = "workoutTemplates")]
    WorkoutTemplates,
    #[strum(serialize = "completedWorkouts")]
    CompletedWorkouts,
    #[strum(serialize = "personalStats")]
    PersonalStats,
    #[strum(serialize = "users")]
    Users,
    #[strum(serialize = "sessions")]
    Sessions,
}

/// Secondary indexes. The key path of an index equals its name.
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Index {
    Name,
    Category,
    Date,
}

/// Storage engine holding the records of all object stores.
///
/// Records are serialized with serde. Implementations open the database lazily on first use
/// and keep it open for their lifetime.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// All records of a store in key order.
    async fn get_all<R: DeserializeOwned>(&self, store: Store) -> Result<Vec<R>, BackendError>;
    /// All records of a store having the indexed field, ordered by it ascending.
    async fn get_all_by_index<R: DeserializeOwned>(
        &self,
        store: Store,
        index: Index,
    ) -> Result<Vec<R>, BackendError>;
    async fn get<R: DeserializeOwned>(
        &self,
        store: Store,
        key: &str,
    ) -> Result<Option<R>, BackendError>;
    /// Insert a record. Fails with [`BackendError::DuplicateKey`] if the key already exists.
    async fn add<R: Serialize>(&self, store: Store, record: &R) -> Result<(), BackendError>;
    /// Insert or replace a record.
    async fn put<R: Serialize>(&self, store: Store, record: &R) -> Result<(), BackendError>;
    /// Remove a record. Removing an absent key is not an error.
    async fn delete(&self, store: Store, key: &str) -> Result<(), BackendError>;
    async fn clear(&self, store: Store) -> Result<(), BackendError>;
    /// Clear the stores contained in the snapshot and insert its records.
    async fn replace_all(&self, snapshot: &Snapshot) -> Result<(), BackendError>;
}

/// Content of the user-data stores, as written by an import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub exercises: Vec<records::Exercise>,
    pub workout_templates: Vec<records::WorkoutTemplate>,
    pub completed_workouts: Vec<records::CompletedWorkout>,
    /// `None` leaves the stored personal stats untouched.
    pub personal_stats: Option<Vec<records::PersonalStats>>,
}

#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("duplicate key \"{key}\" in {store:?}")]
    DuplicateKey { store: Store, key: String },
    #[error("record in {store:?} has no key \"{key_path}\"")]
    MissingKey {
        store: Store,
        key_path: &'static str,
    },
    #[error("unknown store {0:?}")]
    UnknownStore(Store),
    #[error("unknown index {index:?} on {store:?}")]
    UnknownIndex { store: Store, index: Index },
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<BackendError> for domain::StorageError {
    fn from(value: BackendError) -> Self {
        match value {
            BackendError::Unavailable(reason) => domain::StorageError::Unavailable(reason),
            err => domain::StorageError::Other(Box::new(err)),
        }
    }
}

impl From<BackendError> for domain::ReadError {
    fn from(value: BackendError) -> Self {
        domain::ReadError::Storage(value.into())
    }
}

impl From<BackendError> for domain::CreateError {
    fn from(value: BackendError) -> Self {
        match value {
            BackendError::DuplicateKey { .. } => domain::CreateError::Conflict,
            err => domain::CreateError::Storage(err.into()),
        }
    }
}

impl From<BackendError> for domain::UpdateError {
    fn from(value: BackendError) -> Self {
        domain::UpdateError::Storage(value.into())
    }
}

impl From<BackendError> for domain::DeleteError {
    fn from(value: BackendError) -> Self {
        domain::DeleteError::Storage(value.into())
    }
}

impl From<BackendError> for domain::ImportError {
    fn from(value: BackendError) -> Self {
        domain::ImportError::Storage(value.into())
    }
}

/// Local store adapter.
///
/// Maps the domain entities to records and implements all domain repositories on top of a
/// [`Backend`].
pub struct LocalStore<B> {
    backend: B,
}

impl<B: Backend> LocalStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
