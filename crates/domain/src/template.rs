use chrono::{DateTime, Utc};
use derive_more::{Deref, Display};

use crate::{
    CompletedExercise, CompletedWorkoutDraft, CreateError, DeleteError, ExerciseID, ExerciseSet,
    Name, ReadError, UpdateError, ValidationError,
};

pub const MAX_SETS: u32 = 100;
pub const MAX_REPS: u32 = 1000;
/// Maximum planned duration of a set in seconds.
pub const MAX_SET_DURATION: u32 = 24 * 60 * 60;

#[allow(async_fn_in_trait)]
pub trait WorkoutTemplateService {
    async fn get_workout_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError>;
    async fn get_workout_template(&self, id: &TemplateID) -> Result<WorkoutTemplate, ReadError>;
    async fn create_workout_template(
        &self,
        draft: WorkoutTemplateDraft,
    ) -> Result<WorkoutTemplate, CreateError>;
    async fn replace_workout_template(
        &self,
        id: TemplateID,
        draft: WorkoutTemplateDraft,
    ) -> Result<WorkoutTemplate, UpdateError>;
    async fn set_workout_template_favorite(
        &self,
        id: TemplateID,
        favorite: bool,
    ) -> Result<WorkoutTemplate, UpdateError>;
    async fn delete_workout_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutTemplateRepository {
    async fn read_workout_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError>;
    async fn read_workout_template(&self, id: &TemplateID) -> Result<WorkoutTemplate, ReadError>;
    async fn create_workout_template(
        &self,
        template: WorkoutTemplate,
    ) -> Result<WorkoutTemplate, CreateError>;
    async fn replace_workout_template(
        &self,
        template: WorkoutTemplate,
    ) -> Result<WorkoutTemplate, UpdateError>;
    async fn delete_workout_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutTemplate {
    pub id: TemplateID,
    pub name: Name,
    pub exercises: Vec<TemplateExercise>,
    pub notes: String,
    pub favorite: bool,
}

impl WorkoutTemplate {
    /// Estimated duration in minutes.
    #[must_use]
    pub fn estimated_duration(&self) -> u32 {
        calculate_estimated_duration(&self.exercises)
    }

    /// Instantiate the template as a workout starting at `now`.
    ///
    /// Every planned set becomes an empty set carrying the planned reps and duration.
    #[must_use]
    pub fn start(&self, now: DateTime<Utc>) -> CompletedWorkoutDraft {
        CompletedWorkoutDraft {
            template_id: Some(self.id.clone()),
            name: self.name.to_string(),
            date: now,
            duration: 0,
            exercises: self
                .exercises
                .iter()
                .map(|e| CompletedExercise {
                    exercise_id: e.exercise_id.clone(),
                    sets: (0..e.sets.min(MAX_SETS))
                        .map(|_| ExerciseSet {
                            reps: e.reps,
                            weight: None,
                            duration: if e.duration > 0 {
                                Some(e.duration)
                            } else {
                                None
                            },
                        })
                        .collect(),
                    notes: String::new(),
                })
                .collect(),
            notes: String::new(),
        }
    }
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateID(String);

impl From<String> for TemplateID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TemplateID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExercise {
    pub exercise_id: ExerciseID,
    pub sets: u32,
    pub reps: u32,
    pub duration: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutTemplateDraft {
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
    pub notes: String,
    pub favorite: bool,
}

impl WorkoutTemplateDraft {
    pub fn into_workout_template(self, id: TemplateID) -> Result<WorkoutTemplate, ValidationError> {
        let errors = validate_workout_template(&self);
        if !errors.is_empty() {
            return Err(ValidationError(errors));
        }

        Ok(WorkoutTemplate {
            id,
            name: Name::new(&self.name).map_err(|err| ValidationError(vec![err.to_string()]))?,
            exercises: self.exercises,
            notes: self.notes,
            favorite: self.favorite,
        })
    }
}

impl From<&WorkoutTemplate> for WorkoutTemplateDraft {
    fn from(value: &WorkoutTemplate) -> Self {
        Self {
            name: value.name.to_string(),
            exercises: value.exercises.clone(),
            notes: value.notes.clone(),
            favorite: value.favorite,
        }
    }
}

#[must_use]
pub fn validate_workout_template(template: &WorkoutTemplateDraft) -> Vec<String> {
    let mut errors = vec![];

    if template.name.trim().is_empty() {
        errors.push("Workout name is required".to_string());
    }

    if template.exercises.is_empty() {
        errors.push("At least one exercise is required".to_string());
    }

    if template.exercises.iter().any(|e| e.sets > MAX_SETS) {
        errors.push(format!("Number of sets must be at most {MAX_SETS}"));
    }

    if template.exercises.iter().any(|e| e.reps > MAX_REPS) {
        errors.push(format!("Number of reps must be at most {MAX_REPS}"));
    }

    if template.exercises.iter().any(|e| e.duration > MAX_SET_DURATION) {
        errors.push(format!(
            "Set duration must be at most {MAX_SET_DURATION} seconds"
        ));
    }

    errors
}

/// Estimate the duration of a workout in minutes.
///
/// Each set takes two minutes, each exercise adds one minute of transition.
#[must_use]
pub fn calculate_estimated_duration(exercises: &[TemplateExercise]) -> u32 {
    exercises.iter().fold(0, |total: u32, e| {
        total.saturating_add(e.sets.saturating_mul(2).saturating_add(1))
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn template_exercise(exercise_id: &str, sets: u32) -> TemplateExercise {
        TemplateExercise {
            exercise_id: exercise_id.into(),
            sets,
            reps: 10,
            duration: 0,
        }
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&[template_exercise("a", 3)], 7)]
    #[case(&[template_exercise("a", 3), template_exercise("b", 2)], 12)]
    #[case(&[template_exercise("a", 0)], 1)]
    #[case(&[template_exercise("a", u32::MAX), template_exercise("b", 1)], u32::MAX)]
    fn test_calculate_estimated_duration(
        #[case] exercises: &[TemplateExercise],
        #[case] expected: u32,
    ) {
        assert_eq!(calculate_estimated_duration(exercises), expected);
    }

    #[test]
    fn test_validate_workout_template() {
        assert_eq!(
            validate_workout_template(&WorkoutTemplateDraft::default()),
            vec!["Workout name is required", "At least one exercise is required"]
        );
        assert_eq!(
            validate_workout_template(&WorkoutTemplateDraft {
                name: "Push Day".to_string(),
                exercises: vec![template_exercise("a", 3)],
                ..WorkoutTemplateDraft::default()
            }),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_validate_workout_template_limits() {
        let draft = WorkoutTemplateDraft {
            name: "Huge".to_string(),
            exercises: vec![TemplateExercise {
                exercise_id: "a".into(),
                sets: MAX_SETS + 1,
                reps: MAX_REPS + 1,
                duration: MAX_SET_DURATION + 1,
            }],
            ..WorkoutTemplateDraft::default()
        };

        assert_eq!(
            validate_workout_template(&draft),
            vec![
                "Number of sets must be at most 100",
                "Number of reps must be at most 1000",
                "Set duration must be at most 86400 seconds",
            ]
        );
        assert_eq!(
            validate_workout_template(&WorkoutTemplateDraft {
                exercises: vec![TemplateExercise {
                    exercise_id: "a".into(),
                    sets: MAX_SETS,
                    reps: MAX_REPS,
                    duration: MAX_SET_DURATION,
                }],
                ..draft
            }),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_start_limits_sets() {
        let template = WorkoutTemplate {
            id: "template_1".into(),
            name: Name::new("Huge").unwrap(),
            exercises: vec![template_exercise("a", u32::MAX)],
            notes: String::new(),
            favorite: false,
        };

        let now = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();

        assert_eq!(template.start(now).exercises[0].sets.len(), MAX_SETS as usize);
    }

    #[test]
    fn test_into_workout_template() {
        let draft = WorkoutTemplateDraft {
            name: " Push Day ".to_string(),
            exercises: vec![template_exercise("a", 3)],
            notes: "heavy".to_string(),
            favorite: true,
        };
        assert_eq!(
            draft.clone().into_workout_template("template_1".into()),
            Ok(WorkoutTemplate {
                id: "template_1".into(),
                name: Name::new("Push Day").unwrap(),
                exercises: draft.exercises,
                notes: "heavy".to_string(),
                favorite: true,
            })
        );
        assert_eq!(
            WorkoutTemplateDraft::default().into_workout_template("template_1".into()),
            Err(ValidationError(vec![
                "Workout name is required".to_string(),
                "At least one exercise is required".to_string()
            ]))
        );
    }

    #[test]
    fn test_start() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
        let template = WorkoutTemplate {
            id: "template_1".into(),
            name: Name::new("Push Day").unwrap(),
            exercises: vec![
                template_exercise("a", 2),
                TemplateExercise {
                    exercise_id: "b".into(),
                    sets: 1,
                    reps: 0,
                    duration: 60,
                },
            ],
            notes: String::new(),
            favorite: false,
        };

        assert_eq!(
            template.start(now),
            CompletedWorkoutDraft {
                template_id: Some("template_1".into()),
                name: "Push Day".to_string(),
                date: now,
                duration: 0,
                exercises: vec![
                    CompletedExercise {
                        exercise_id: "a".into(),
                        sets: vec![
                            ExerciseSet {
                                reps: 10,
                                weight: None,
                                duration: None
                            };
                            2
                        ],
                        notes: String::new(),
                    },
                    CompletedExercise {
                        exercise_id: "b".into(),
                        sets: vec![ExerciseSet {
                            reps: 0,
                            weight: None,
                            duration: Some(60)
                        }],
                        notes: String::new(),
                    },
                ],
                notes: String::new(),
            }
        );
        assert_eq!(template.estimated_duration(), 8);
    }
}
