//! Serialized form of the domain entities.
//!
//! Field names follow the backup file format, so records are stored and exported unchanged.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workout_tracker_domain as domain;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("invalid category \"{0}\"")]
    InvalidCategory(String),
    #[error("invalid weight unit \"{0}\"")]
    InvalidWeightUnit(String),
    #[error("missing date")]
    MissingDate,
    #[error(transparent)]
    InvalidName(#[from] domain::NameError),
    #[error(transparent)]
    Invalid(#[from] domain::ValidationError),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_muscles: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sets: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_reps: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,
}

impl From<&domain::Exercise> for Exercise {
    fn from(value: &domain::Exercise) -> Self {
        let draft = domain::ExerciseDraft::from(value);
        Self {
            id: value.id.to_string(),
            name: draft.name,
            category: value.category().to_string(),
            description: draft.description,
            target_muscles: draft.target_muscles,
            equipment: draft.equipment,
            default_sets: draft.default_sets,
            default_reps: draft.default_reps,
            default_duration: draft.default_duration,
            default_weight: draft.default_weight,
            weight_unit: draft.weight_unit.map(|u| u.to_string()),
        }
    }
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = RecordError;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        let category = domain::ExerciseCategory::from_str(&value.category)
            .map_err(|_| RecordError::InvalidCategory(value.category.clone()))?;
        let weight_unit = value
            .weight_unit
            .map(|unit| {
                domain::WeightUnit::from_str(&unit).map_err(|_| RecordError::InvalidWeightUnit(unit))
            })
            .transpose()?;
        Ok(domain::ExerciseDraft {
            name: value.name,
            category: Some(category),
            description: value.description,
            target_muscles: value.target_muscles,
            equipment: value.equipment,
            default_sets: value.default_sets,
            default_reps: value.default_reps,
            default_duration: value.default_duration,
            default_weight: value.default_weight,
            weight_unit,
        }
        .into_exercise(value.id.into())?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub favorite: bool,
    /// Derived from the exercises, ignored when reading.
    #[serde(default)]
    pub estimated_duration: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    pub exercise_id: String,
    pub sets: u32,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub duration: u32,
}

impl From<&domain::WorkoutTemplate> for WorkoutTemplate {
    fn from(value: &domain::WorkoutTemplate) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            exercises: value
                .exercises
                .iter()
                .map(|e| TemplateExercise {
                    exercise_id: e.exercise_id.to_string(),
                    sets: e.sets,
                    reps: e.reps,
                    duration: e.duration,
                })
                .collect(),
            notes: value.notes.clone(),
            favorite: value.favorite,
            estimated_duration: value.estimated_duration(),
        }
    }
}

impl TryFrom<WorkoutTemplate> for domain::WorkoutTemplate {
    type Error = RecordError;

    fn try_from(value: WorkoutTemplate) -> Result<Self, Self::Error> {
        Ok(domain::WorkoutTemplateDraft {
            name: value.name,
            exercises: value
                .exercises
                .into_iter()
                .map(|e| domain::TemplateExercise {
                    exercise_id: e.exercise_id.into(),
                    sets: e.sets,
                    reps: e.reps,
                    duration: e.duration,
                })
                .collect(),
            notes: value.notes,
            favorite: value.favorite,
        }
        .into_workout_template(value.id.into())?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWorkout {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub name: String,
    /// Absent in records written before schema version 3.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: u32,
    pub exercises: Vec<CompletedExercise>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedExercise {
    pub exercise_id: String,
    pub sets: Vec<ExerciseSet>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    #[serde(default)]
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl From<&domain::CompletedWorkout> for CompletedWorkout {
    fn from(value: &domain::CompletedWorkout) -> Self {
        Self {
            id: value.id.to_string(),
            template_id: value.template_id.as_ref().map(ToString::to_string),
            name: value.name.clone(),
            date: Some(value.date),
            duration: value.duration,
            exercises: value
                .exercises
                .iter()
                .map(|e| CompletedExercise {
                    exercise_id: e.exercise_id.to_string(),
                    sets: e
                        .sets
                        .iter()
                        .map(|s| ExerciseSet {
                            reps: s.reps,
                            weight: s.weight,
                            duration: s.duration,
                        })
                        .collect(),
                    notes: e.notes.clone(),
                })
                .collect(),
            notes: value.notes.clone(),
        }
    }
}

impl TryFrom<CompletedWorkout> for domain::CompletedWorkout {
    type Error = RecordError;

    fn try_from(value: CompletedWorkout) -> Result<Self, Self::Error> {
        Ok(domain::CompletedWorkoutDraft {
            template_id: value.template_id.map(domain::TemplateID::from),
            name: value.name,
            date: value.date.ok_or(RecordError::MissingDate)?,
            duration: value.duration,
            exercises: value
                .exercises
                .into_iter()
                .map(|e| domain::CompletedExercise {
                    exercise_id: e.exercise_id.into(),
                    sets: e
                        .sets
                        .into_iter()
                        .map(|s| domain::ExerciseSet {
                            reps: s.reps,
                            weight: s.weight,
                            duration: s.duration,
                        })
                        .collect(),
                    notes: e.notes,
                })
                .collect(),
            notes: value.notes,
        }
        .into_completed_workout(value.id.into())?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalStats {
    pub id: String,
    pub date: NaiveDate,
    pub weight: f32,
    pub height: f32,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
}

impl From<&domain::PersonalStats> for PersonalStats {
    fn from(value: &domain::PersonalStats) -> Self {
        Self {
            id: value.id.to_string(),
            date: value.date,
            weight: value.weight,
            height: value.height,
            age: value.age,
            body_fat_percentage: value.body_fat,
            notes: value.notes.clone(),
            created_at: value.created_at,
        }
    }
}

impl TryFrom<PersonalStats> for domain::PersonalStats {
    type Error = RecordError;

    fn try_from(value: PersonalStats) -> Result<Self, Self::Error> {
        Ok(domain::PersonalStatsDraft {
            date: value.date,
            weight: value.weight,
            height: value.height,
            age: value.age,
            body_fat: value.body_fat_percentage,
            notes: value.notes,
        }
        .into_personal_stats(value.id.into(), value.created_at)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub id: Uuid,
    pub name: String,
    pub password_hash: String,
}

impl From<&domain::User> for User {
    fn from(value: &domain::User) -> Self {
        Self {
            email: value.email.to_string(),
            id: *value.id,
            name: value.name.to_string(),
            password_hash: value.password_hash.clone(),
        }
    }
}

impl TryFrom<User> for domain::User {
    type Error = RecordError;

    fn try_from(value: User) -> Result<Self, Self::Error> {
        Ok(Self {
            email: domain::Email::new(&value.email),
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            password_hash: value.password_hash,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: Uuid,
    pub email: String,
    pub expires_at: i64,
}

impl From<&domain::Session> for Session {
    fn from(value: &domain::Session) -> Self {
        Self {
            token: *value.token,
            email: value.email.to_string(),
            expires_at: value.expires_at,
        }
    }
}

impl From<Session> for domain::Session {
    fn from(value: Session) -> Self {
        Self {
            token: value.token.into(),
            email: domain::Email::new(&value.email),
            expires_at: value.expires_at,
        }
    }
}

/// RFC 3339 with exactly three fraction digits, so that the text order of stored dates matches
/// their chronological order.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        date: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => {
                serializer.serialize_some(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer)
    }
}
