use std::{borrow::Borrow, ops::RangeInclusive};

use chrono::{DateTime, Utc};

use crate::{CompletedWorkout, Exercise, ExerciseCategory, ExerciseID};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseFilter {
    pub name: String,
    pub category: Option<ExerciseCategory>,
    pub muscle: Option<String>,
}

impl ExerciseFilter {
    #[must_use]
    pub fn exercises<'a>(
        &self,
        exercises: impl Iterator<Item = &'a Exercise>,
    ) -> Vec<&'a Exercise> {
        let name = self.name.trim().to_lowercase();
        exercises
            .filter(|e| {
                e.name.as_str().to_lowercase().contains(&name)
                    && self.category.is_none_or(|c| e.category() == c)
                    && self
                        .muscle
                        .as_ref()
                        .is_none_or(|m| e.target_muscles.contains(m))
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.category.is_none() && self.muscle.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutFilter {
    pub date_range: Option<RangeInclusive<DateTime<Utc>>>,
    pub exercise: Option<ExerciseID>,
    pub has_notes: Option<bool>,
}

impl WorkoutFilter {
    #[must_use]
    pub fn workouts<'a>(
        &self,
        workouts: impl Iterator<Item = &'a CompletedWorkout>,
    ) -> Vec<&'a CompletedWorkout> {
        workouts
            .filter(|w| {
                self.date_range
                    .as_ref()
                    .is_none_or(|range| range.contains(&w.date))
                    && self
                        .exercise
                        .as_ref()
                        .is_none_or(|id| w.exercises.iter().any(|e| e.exercise_id == *id))
                    && self
                        .has_notes
                        .is_none_or(|has_notes| has_notes != w.notes.trim().is_empty())
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.exercise.is_none() && self.has_notes.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkoutSortKey {
    Name,
    #[default]
    Date,
    ExerciseCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Sort workouts in place.
///
/// Workouts with equal keys keep their relative order when sorting ascending and are reversed
/// when sorting descending.
pub fn sort_workouts<W: Borrow<CompletedWorkout>>(
    workouts: &mut [W],
    key: WorkoutSortKey,
    direction: SortDirection,
) {
    match key {
        WorkoutSortKey::Name => {
            workouts.sort_by_cached_key(|w| w.borrow().name.to_lowercase());
        }
        WorkoutSortKey::Date => workouts.sort_by_key(|w| w.borrow().date),
        WorkoutSortKey::ExerciseCount => workouts.sort_by_key(|w| w.borrow().exercises.len()),
    }
    if direction == SortDirection::Descending {
        workouts.reverse();
    }
}
