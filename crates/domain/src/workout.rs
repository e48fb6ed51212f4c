use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use derive_more::{Deref, Display};

use crate::{
    CreateError, DeleteError, ExerciseID, ReadError, TemplateID, UpdateError, ValidationError,
};

pub const DEFAULT_BODY_WEIGHT: f32 = 70.0;

const MET: f32 = 5.0;

#[allow(async_fn_in_trait)]
pub trait CompletedWorkoutService {
    async fn get_completed_workouts(&self) -> Result<Vec<CompletedWorkout>, ReadError>;
    async fn get_completed_workout(&self, id: &WorkoutID) -> Result<CompletedWorkout, ReadError>;
    async fn create_completed_workout(
        &self,
        draft: CompletedWorkoutDraft,
    ) -> Result<CompletedWorkout, CreateError>;
    async fn replace_completed_workout(
        &self,
        id: WorkoutID,
        draft: CompletedWorkoutDraft,
    ) -> Result<CompletedWorkout, UpdateError>;
    async fn delete_completed_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait CompletedWorkoutRepository {
    /// Read all workouts ordered by date, oldest first.
    async fn read_completed_workouts(&self) -> Result<Vec<CompletedWorkout>, ReadError>;
    async fn read_completed_workout(&self, id: &WorkoutID) -> Result<CompletedWorkout, ReadError>;
    async fn create_completed_workout(
        &self,
        workout: CompletedWorkout,
    ) -> Result<CompletedWorkout, CreateError>;
    async fn replace_completed_workout(
        &self,
        workout: CompletedWorkout,
    ) -> Result<CompletedWorkout, UpdateError>;
    async fn delete_completed_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedWorkout {
    pub id: WorkoutID,
    pub template_id: Option<TemplateID>,
    pub name: String,
    pub date: DateTime<Utc>,
    /// Duration in seconds.
    pub duration: u32,
    pub exercises: Vec<CompletedExercise>,
    pub notes: String,
}

impl CompletedWorkout {
    #[must_use]
    pub fn exercises(&self) -> BTreeSet<ExerciseID> {
        self.exercises
            .iter()
            .map(|e| e.exercise_id.clone())
            .collect()
    }

    /// Sum of weight times reps over all sets.
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.exercises.iter().map(CompletedExercise::volume).sum()
    }

    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    #[must_use]
    pub fn estimated_calories(&self, body_weight: Option<f32>) -> u32 {
        estimate_calories(self.duration, body_weight.unwrap_or(DEFAULT_BODY_WEIGHT))
    }
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkoutID(String);

impl From<String> for WorkoutID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkoutID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedExercise {
    pub exercise_id: ExerciseID,
    pub sets: Vec<ExerciseSet>,
    pub notes: String,
}

impl CompletedExercise {
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.sets.iter().map(ExerciseSet::volume).sum()
    }

    #[must_use]
    pub fn max_weight(&self) -> Option<f32> {
        self.sets
            .iter()
            .filter_map(|s| s.weight)
            .filter(|w| *w > 0.0)
            .reduce(f32::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSet {
    pub reps: u32,
    pub weight: Option<f32>,
    /// Duration in seconds.
    pub duration: Option<u32>,
}

impl ExerciseSet {
    #[must_use]
    pub fn volume(&self) -> f32 {
        match self.weight {
            #[allow(clippy::cast_precision_loss)]
            Some(weight) if weight > 0.0 && self.reps > 0 => weight * self.reps as f32,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedWorkoutDraft {
    pub template_id: Option<TemplateID>,
    pub name: String,
    pub date: DateTime<Utc>,
    pub duration: u32,
    pub exercises: Vec<CompletedExercise>,
    pub notes: String,
}

impl CompletedWorkoutDraft {
    #[must_use]
    pub fn new(name: &str, date: DateTime<Utc>) -> Self {
        Self {
            template_id: None,
            name: name.to_string(),
            date,
            duration: 0,
            exercises: vec![],
            notes: String::new(),
        }
    }

    pub fn into_completed_workout(self, id: WorkoutID) -> Result<CompletedWorkout, ValidationError> {
        let errors = validate_completed_workout(&self);
        if !errors.is_empty() {
            return Err(ValidationError(errors));
        }

        Ok(CompletedWorkout {
            id,
            template_id: self.template_id,
            name: self.name.trim().to_string(),
            date: self.date,
            duration: self.duration,
            exercises: self.exercises,
            notes: self.notes,
        })
    }
}

impl From<&CompletedWorkout> for CompletedWorkoutDraft {
    fn from(value: &CompletedWorkout) -> Self {
        Self {
            template_id: value.template_id.clone(),
            name: value.name.clone(),
            date: value.date,
            duration: value.duration,
            exercises: value.exercises.clone(),
            notes: value.notes.clone(),
        }
    }
}

#[must_use]
pub fn validate_completed_workout(workout: &CompletedWorkoutDraft) -> Vec<String> {
    let mut errors = vec![];

    if workout.name.trim().is_empty() {
        errors.push("Workout name is required".to_string());
    }

    if workout.exercises.is_empty() {
        errors.push("At least one exercise is required".to_string());
    }

    errors
}

/// Estimate the calories burned during a workout of moderate intensity.
///
/// `duration` is given in seconds, `body_weight` in kg.
#[must_use]
pub fn estimate_calories(duration: u32, body_weight: f32) -> u32 {
    #[allow(clippy::cast_precision_loss)]
    let minutes = duration as f32 / 60.0;
    let calories = (minutes * MET * 3.5 * body_weight / 200.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let calories = calories.max(0.0) as u32;
    calories
}

/// Format a duration given in seconds as `MM:SS`, or `HH:MM:SS` from one hour on.
#[must_use]
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
