use std::collections::BTreeSet;

use derive_more::{Deref, Display};

use crate::{CreateError, DeleteError, Name, ReadError, UpdateError, ValidationError};

pub const UNKNOWN_EXERCISE: &str = "Unknown exercise";

pub const DEFAULT_SETS: Sets = Sets(3);
pub const DEFAULT_REPS: Reps = Reps(10);

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn get_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError>;
    async fn create_exercise(&self, draft: ExerciseDraft) -> Result<Exercise, CreateError>;
    async fn create_exercise_from_catalog(&self, catalog_id: &str)
    -> Result<Exercise, CreateError>;
    async fn replace_exercise(
        &self,
        id: ExerciseID,
        draft: ExerciseDraft,
    ) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn read_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError>;
    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub description: String,
    pub target_muscles: BTreeSet<String>,
    pub equipment: BTreeSet<String>,
    pub defaults: ExerciseDefaults,
}

impl Exercise {
    #[must_use]
    pub fn category(&self) -> ExerciseCategory {
        self.defaults.category()
    }
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExerciseID(String);

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[strum(serialize_all = "lowercase")]
pub enum ExerciseCategory {
    Strength,
    Bodyweight,
    Cardio,
    Flexibility,
    Hiit,
}

/// Default prescription of an exercise, shaped by its category.
///
/// Durations are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseDefaults {
    Strength {
        sets: Sets,
        reps: Reps,
        weight: Option<Load>,
    },
    Bodyweight {
        sets: Sets,
        reps: Reps,
    },
    Cardio {
        duration: u32,
    },
    Flexibility {
        sets: Sets,
        duration: u32,
    },
    Hiit {
        sets: Sets,
        duration: u32,
    },
}

impl ExerciseDefaults {
    /// Pick the values relevant for `category`, falling back to defaults for missing ones.
    #[must_use]
    pub fn new(
        category: ExerciseCategory,
        sets: Option<Sets>,
        reps: Option<Reps>,
        duration: Option<u32>,
        weight: Option<Load>,
    ) -> Self {
        let sets = sets.unwrap_or(DEFAULT_SETS);
        let reps = reps.unwrap_or(DEFAULT_REPS);
        let duration = duration.unwrap_or_default();
        match category {
            ExerciseCategory::Strength => ExerciseDefaults::Strength { sets, reps, weight },
            ExerciseCategory::Bodyweight => ExerciseDefaults::Bodyweight { sets, reps },
            ExerciseCategory::Cardio => ExerciseDefaults::Cardio { duration },
            ExerciseCategory::Flexibility => ExerciseDefaults::Flexibility { sets, duration },
            ExerciseCategory::Hiit => ExerciseDefaults::Hiit { sets, duration },
        }
    }

    #[must_use]
    pub fn category(&self) -> ExerciseCategory {
        match self {
            ExerciseDefaults::Strength { .. } => ExerciseCategory::Strength,
            ExerciseDefaults::Bodyweight { .. } => ExerciseCategory::Bodyweight,
            ExerciseDefaults::Cardio { .. } => ExerciseCategory::Cardio,
            ExerciseDefaults::Flexibility { .. } => ExerciseCategory::Flexibility,
            ExerciseDefaults::Hiit { .. } => ExerciseCategory::Hiit,
        }
    }

    #[must_use]
    pub fn sets(&self) -> Option<Sets> {
        match self {
            ExerciseDefaults::Strength { sets, .. }
            | ExerciseDefaults::Bodyweight { sets, .. }
            | ExerciseDefaults::Flexibility { sets, .. }
            | ExerciseDefaults::Hiit { sets, .. } => Some(*sets),
            ExerciseDefaults::Cardio { .. } => None,
        }
    }

    #[must_use]
    pub fn reps(&self) -> Option<Reps> {
        match self {
            ExerciseDefaults::Strength { reps, .. } | ExerciseDefaults::Bodyweight { reps, .. } => {
                Some(*reps)
            }
            ExerciseDefaults::Cardio { .. }
            | ExerciseDefaults::Flexibility { .. }
            | ExerciseDefaults::Hiit { .. } => None,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Option<u32> {
        match self {
            ExerciseDefaults::Cardio { duration }
            | ExerciseDefaults::Flexibility { duration, .. }
            | ExerciseDefaults::Hiit { duration, .. } => Some(*duration),
            ExerciseDefaults::Strength { .. } | ExerciseDefaults::Bodyweight { .. } => None,
        }
    }

    #[must_use]
    pub fn weight(&self) -> Option<Load> {
        match self {
            ExerciseDefaults::Strength { weight, .. } => *weight,
            _ => None,
        }
    }
}

#[derive(Deref, Display, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sets(u32);

impl Sets {
    pub fn new(value: u32) -> Result<Self, CountError> {
        if value < 1 {
            return Err(CountError::Zero);
        }
        Ok(Self(value))
    }
}

#[derive(Deref, Display, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, CountError> {
        if value < 1 {
            return Err(CountError::Zero);
        }
        Ok(Self(value))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CountError {
    #[error("Value must be at least 1")]
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Load {
    pub value: f32,
    pub unit: WeightUnit,
}

impl Load {
    #[must_use]
    pub fn kg(&self) -> f32 {
        match self.unit {
            WeightUnit::Kg => self.value,
            WeightUnit::Lbs => self.value * KG_PER_LB,
        }
    }
}

const KG_PER_LB: f32 = 0.453_592_37;

#[derive(
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
)]
#[strum(serialize_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

/// Unvalidated exercise input as entered in a form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseDraft {
    pub name: String,
    pub category: Option<ExerciseCategory>,
    pub description: String,
    pub target_muscles: Vec<String>,
    pub equipment: Vec<String>,
    pub default_sets: Option<i32>,
    pub default_reps: Option<i32>,
    pub default_duration: Option<u32>,
    pub default_weight: Option<f32>,
    pub weight_unit: Option<WeightUnit>,
}

impl ExerciseDraft {
    pub fn into_exercise(self, id: ExerciseID) -> Result<Exercise, ValidationError> {
        let errors = validate_exercise(&self);
        if !errors.is_empty() {
            return Err(ValidationError(errors));
        }

        let name = Name::new(&self.name).map_err(|err| ValidationError(vec![err.to_string()]))?;
        let category = self
            .category
            .ok_or_else(|| ValidationError(vec!["Category is required".to_string()]))?;
        let sets = self
            .default_sets
            .and_then(|s| u32::try_from(s).ok())
            .and_then(|s| Sets::new(s).ok());
        let reps = self
            .default_reps
            .and_then(|r| u32::try_from(r).ok())
            .and_then(|r| Reps::new(r).ok());
        let weight = self.default_weight.map(|value| Load {
            value,
            unit: self.weight_unit.unwrap_or_default(),
        });

        Ok(Exercise {
            id,
            name,
            description: self.description.trim().to_string(),
            target_muscles: normalize(self.target_muscles),
            equipment: normalize(self.equipment),
            defaults: ExerciseDefaults::new(
                category,
                sets,
                reps,
                self.default_duration,
                weight,
            ),
        })
    }
}

impl From<&Exercise> for ExerciseDraft {
    fn from(value: &Exercise) -> Self {
        let weight = value.defaults.weight();
        Self {
            name: value.name.to_string(),
            category: Some(value.category()),
            description: value.description.clone(),
            target_muscles: value.target_muscles.iter().cloned().collect(),
            equipment: value.equipment.iter().cloned().collect(),
            default_sets: value
                .defaults
                .sets()
                .and_then(|s| i32::try_from(*s).ok()),
            default_reps: value
                .defaults
                .reps()
                .and_then(|r| i32::try_from(*r).ok()),
            default_duration: value.defaults.duration(),
            default_weight: weight.map(|w| w.value),
            weight_unit: weight.map(|w| w.unit),
        }
    }
}

fn normalize(values: Vec<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Check an exercise draft against the form rules.
///
/// Returns one message per violated rule, an empty list means the draft is valid.
#[must_use]
pub fn validate_exercise(exercise: &ExerciseDraft) -> Vec<String> {
    let mut errors = vec![];

    if exercise.name.trim().is_empty() {
        errors.push("Exercise name is required".to_string());
    }

    if exercise.category.is_none() {
        errors.push("Category is required".to_string());
    }

    if !exercise.target_muscles.iter().any(|m| !m.trim().is_empty()) {
        errors.push("At least one target muscle group is required".to_string());
    }

    if exercise.default_sets.is_some_and(|s| s < 1) {
        errors.push("Default sets must be at least 1".to_string());
    }

    if exercise.default_reps.is_some_and(|r| r < 1) {
        errors.push("Default reps must be at least 1".to_string());
    }

    errors
}

/// Name of the referenced exercise, or a placeholder if it no longer exists.
#[must_use]
pub fn exercise_name<'a>(exercises: &'a [Exercise], id: &ExerciseID) -> &'a str {
    exercises
        .iter()
        .find(|e| e.id == *id)
        .map_or(UNKNOWN_EXERCISE, |e| e.name.as_str())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn draft() -> ExerciseDraft {
        ExerciseDraft {
            name: "Bench Press".to_string(),
            category: Some(ExerciseCategory::Strength),
            description: "Press the barbell up from your chest.".to_string(),
            target_muscles: vec!["Chest".to_string(), "Triceps".to_string()],
            equipment: vec!["Barbell".to_string()],
            default_sets: Some(3),
            default_reps: Some(10),
            default_duration: None,
            default_weight: Some(60.0),
            weight_unit: Some(WeightUnit::Kg),
        }
    }

    #[test]
    fn test_validate_exercise_valid() {
        assert_eq!(validate_exercise(&draft()), Vec::<String>::new());
    }

    #[test]
    fn test_validate_exercise_empty() {
        assert_eq!(
            validate_exercise(&ExerciseDraft::default()),
            vec![
                "Exercise name is required",
                "Category is required",
                "At least one target muscle group is required",
            ]
        );
    }

    #[rstest]
    #[case(1, false)]
    #[case(0, true)]
    #[case(-1, true)]
    #[case(-100, true)]
    fn test_validate_exercise_sets(#[case] sets: i32, #[case] error: bool) {
        let exercise = ExerciseDraft {
            default_sets: Some(sets),
            ..draft()
        };
        assert_eq!(
            validate_exercise(&exercise).contains(&"Default sets must be at least 1".to_string()),
            error
        );
    }

    #[rstest]
    #[case(Some(1), false)]
    #[case(Some(0), true)]
    #[case(None, false)]
    fn test_validate_exercise_reps(#[case] reps: Option<i32>, #[case] error: bool) {
        let exercise = ExerciseDraft {
            default_reps: reps,
            ..draft()
        };
        assert_eq!(
            validate_exercise(&exercise).contains(&"Default reps must be at least 1".to_string()),
            error
        );
    }

    #[test]
    fn test_validate_exercise_blank_name_and_muscles() {
        let exercise = ExerciseDraft {
            name: "   ".to_string(),
            target_muscles: vec![" ".to_string()],
            ..draft()
        };
        assert_eq!(
            validate_exercise(&exercise),
            vec![
                "Exercise name is required",
                "At least one target muscle group is required",
            ]
        );
    }

    #[test]
    fn test_exercise_draft_into_exercise() {
        assert_eq!(
            draft().into_exercise("exercise_1".into()),
            Ok(Exercise {
                id: "exercise_1".into(),
                name: Name::new("Bench Press").unwrap(),
                description: "Press the barbell up from your chest.".to_string(),
                target_muscles: BTreeSet::from(["Chest".to_string(), "Triceps".to_string()]),
                equipment: BTreeSet::from(["Barbell".to_string()]),
                defaults: ExerciseDefaults::Strength {
                    sets: Sets(3),
                    reps: Reps(10),
                    weight: Some(Load {
                        value: 60.0,
                        unit: WeightUnit::Kg
                    }),
                },
            })
        );
    }

    #[test]
    fn test_exercise_draft_into_exercise_invalid() {
        assert_eq!(
            ExerciseDraft {
                default_sets: Some(0),
                ..draft()
            }
            .into_exercise("exercise_1".into()),
            Err(ValidationError(vec![
                "Default sets must be at least 1".to_string()
            ]))
        );
    }

    #[test]
    fn test_exercise_draft_cardio_drops_strength_fields() {
        let exercise = ExerciseDraft {
            category: Some(ExerciseCategory::Cardio),
            default_duration: Some(1200),
            ..draft()
        }
        .into_exercise("exercise_2".into())
        .unwrap();

        assert_eq!(
            exercise.defaults,
            ExerciseDefaults::Cardio { duration: 1200 }
        );
        assert_eq!(exercise.defaults.sets(), None);
        assert_eq!(exercise.defaults.weight(), None);
    }

    #[test]
    fn test_exercise_draft_from_exercise() {
        let exercise = draft().into_exercise("exercise_1".into()).unwrap();
        assert_eq!(
            ExerciseDraft::from(&exercise).into_exercise("exercise_1".into()),
            Ok(exercise)
        );
    }

    #[rstest]
    #[case(ExerciseCategory::Strength, Some(3), Some(10), None)]
    #[case(ExerciseCategory::Bodyweight, Some(3), Some(10), None)]
    #[case(ExerciseCategory::Cardio, None, None, Some(0))]
    #[case(ExerciseCategory::Flexibility, Some(3), None, Some(0))]
    #[case(ExerciseCategory::Hiit, Some(3), None, Some(0))]
    fn test_exercise_defaults_new(
        #[case] category: ExerciseCategory,
        #[case] sets: Option<u32>,
        #[case] reps: Option<u32>,
        #[case] duration: Option<u32>,
    ) {
        let defaults = ExerciseDefaults::new(category, None, None, None, None);
        assert_eq!(defaults.category(), category);
        assert_eq!(defaults.sets().map(|s| *s), sets);
        assert_eq!(defaults.reps().map(|r| *r), reps);
        assert_eq!(defaults.duration(), duration);
    }

    #[rstest]
    #[case("strength", Ok(ExerciseCategory::Strength))]
    #[case("hiit", Ok(ExerciseCategory::Hiit))]
    #[case("yoga", Err(strum::ParseError::VariantNotFound))]
    fn test_exercise_category_from_str(
        #[case] value: &str,
        #[case] expected: Result<ExerciseCategory, strum::ParseError>,
    ) {
        assert_eq!(value.parse::<ExerciseCategory>(), expected);
    }

    #[test]
    fn test_sets_reps_new() {
        assert_eq!(Sets::new(0), Err(CountError::Zero));
        assert_eq!(Sets::new(1), Ok(Sets(1)));
        assert_eq!(Reps::new(0), Err(CountError::Zero));
        assert_eq!(Reps::new(12), Ok(Reps(12)));
    }

    #[test]
    fn test_load_kg() {
        assert_eq!(
            Load {
                value: 100.0,
                unit: WeightUnit::Kg
            }
            .kg(),
            100.0
        );
        assert_approx_eq::assert_approx_eq!(
            Load {
                value: 100.0,
                unit: WeightUnit::Lbs
            }
            .kg(),
            45.359_24,
            0.001
        );
    }

    #[test]
    fn test_exercise_name() {
        let exercise = draft().into_exercise("exercise_1".into()).unwrap();
        let exercises = vec![exercise];

        assert_eq!(exercise_name(&exercises, &"exercise_1".into()), "Bench Press");
        assert_eq!(exercise_name(&exercises, &"exercise_2".into()), UNKNOWN_EXERCISE);
    }
}
