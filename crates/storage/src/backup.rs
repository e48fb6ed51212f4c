use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use workout_tracker_domain as domain;

use crate::{Backend, LocalStore, Snapshot, Store, records};

pub const BACKUP_VERSION: &str = "1.0";

const EXERCISES: &str = "exercises";
const WORKOUT_TEMPLATES: &str = "workoutTemplates";
const COMPLETED_WORKOUTS: &str = "completedWorkouts";
const PERSONAL_STATS: &str = "personalStats";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Backup {
    version: &'static str,
    timestamp: DateTime<Utc>,
    exercises: Vec<records::Exercise>,
    workout_templates: Vec<records::WorkoutTemplate>,
    completed_workouts: Vec<records::CompletedWorkout>,
    personal_stats: Vec<records::PersonalStats>,
}

impl<B: Backend> LocalStore<B> {
    pub async fn export_backup_at(&self, now: DateTime<Utc>) -> Result<String, domain::ReadError> {
        let backup = Backup {
            version: BACKUP_VERSION,
            timestamp: now,
            exercises: self.backend.get_all(Store::Exercises).await?,
            workout_templates: self.backend.get_all(Store::WorkoutTemplates).await?,
            completed_workouts: self.backend.get_all(Store::CompletedWorkouts).await?,
            personal_stats: self.backend.get_all(Store::PersonalStats).await?,
        };
        serde_json::to_string_pretty(&backup).map_err(|err| domain::ReadError::Other(Box::new(err)))
    }
}

impl<B: Backend> domain::BackupRepository for LocalStore<B> {
    async fn export_backup(&self) -> Result<String, domain::ReadError> {
        self.export_backup_at(Utc::now()).await
    }

    async fn import_backup(
        &self,
        document: &str,
    ) -> Result<domain::ImportSummary, domain::ImportError> {
        let snapshot = parse_backup(document)?;
        let summary = domain::ImportSummary {
            exercises: snapshot.exercises.len(),
            workout_templates: snapshot.workout_templates.len(),
            completed_workouts: snapshot.completed_workouts.len(),
            personal_stats: snapshot.personal_stats.as_ref().map(Vec::len),
        };
        debug!("importing backup: {summary:?}");
        self.backend.replace_all(&snapshot).await?;
        Ok(summary)
    }
}

/// Parse and validate a complete backup document.
pub fn parse_backup(document: &str) -> Result<Snapshot, domain::ImportError> {
    let value: Value =
        serde_json::from_str(document).map_err(|err| domain::ImportError::Parse(err.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(domain::ImportError::Parse("expected an object".to_string()));
    };
    if !object.get("version").is_some_and(Value::is_string) {
        return Err(domain::ImportError::Parse("missing version".to_string()));
    }

    Ok(Snapshot {
        exercises: required::<records::Exercise, domain::Exercise>(
            &mut object,
            EXERCISES,
            |r| r.id.as_str(),
        )?,
        workout_templates: required::<records::WorkoutTemplate, domain::WorkoutTemplate>(
            &mut object,
            WORKOUT_TEMPLATES,
            |r| r.id.as_str(),
        )?,
        completed_workouts: required::<records::CompletedWorkout, domain::CompletedWorkout>(
            &mut object,
            COMPLETED_WORKOUTS,
            |r| r.id.as_str(),
        )?,
        personal_stats: array(&mut object, PERSONAL_STATS)?
            .map(|items| {
                convert::<records::PersonalStats, domain::PersonalStats>(
                    PERSONAL_STATS,
                    items,
                    |r| r.id.as_str(),
                )
            })
            .transpose()?,
    })
}

fn array(
    object: &mut Map<String, Value>,
    collection: &'static str,
) -> Result<Option<Vec<Value>>, domain::ImportError> {
    match object.remove(collection) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(domain::ImportError::Parse(format!(
            "\"{collection}\" must be an array"
        ))),
    }
}

fn required<R, D>(
    object: &mut Map<String, Value>,
    collection: &'static str,
    id: impl Fn(&R) -> &str,
) -> Result<Vec<R>, domain::ImportError>
where
    R: DeserializeOwned + for<'a> From<&'a D>,
    D: TryFrom<R, Error = records::RecordError>,
{
    let items = array(object, collection)?.ok_or(domain::ImportError::MissingCollection(collection))?;
    convert::<R, D>(collection, items, id)
}

/// Deserialize and validate the records of a collection.
///
/// Records are normalized by a round trip through the domain type.
fn convert<R, D>(
    collection: &'static str,
    items: Vec<Value>,
    id: impl Fn(&R) -> &str,
) -> Result<Vec<R>, domain::ImportError>
where
    R: DeserializeOwned + for<'a> From<&'a D>,
    D: TryFrom<R, Error = records::RecordError>,
{
    let mut ids = BTreeSet::new();
    let mut result = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let invalid = |reason: String| domain::ImportError::InvalidRecord {
            collection,
            index,
            reason,
        };
        let record = serde_json::from_value::<R>(item).map_err(|err| invalid(err.to_string()))?;
        let entity = D::try_from(record).map_err(|err| invalid(err.to_string()))?;
        let record = R::from(&entity);
        if !ids.insert(id(&record).to_string()) {
            return Err(domain::ImportError::DuplicateId {
                collection,
                id: id(&record).to_string(),
            });
        }
        result.push(record);
    }
    Ok(result)
}
