use crate::{Exercise, ExerciseCategory, ExerciseDraft, ExerciseID, ValidationError};

/// Predefined exercise a user can add to their library.
#[derive(Clone)]
pub struct CatalogExercise {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ExerciseCategory,
    pub equipment: &'static [&'static str],
    pub description: &'static str,
    pub target_muscles: &'static [&'static str],
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration: Option<u32>,
}

impl CatalogExercise {
    #[must_use]
    pub fn draft(&self) -> ExerciseDraft {
        ExerciseDraft {
            name: self.name.to_string(),
            category: Some(self.category),
            description: self.description.to_string(),
            target_muscles: self.target_muscles.iter().map(ToString::to_string).collect(),
            equipment: self.equipment.iter().map(ToString::to_string).collect(),
            default_sets: self.sets,
            default_reps: self.reps,
            default_duration: self.duration,
            default_weight: None,
            weight_unit: None,
        }
    }

    pub fn to_exercise(&self) -> Result<Exercise, ValidationError> {
        self.draft().into_exercise(ExerciseID::from(self.id))
    }
}

#[must_use]
pub fn find(id: &str) -> Option<&'static CatalogExercise> {
    EXERCISES.iter().find(|e| e.id == id)
}

pub const EXERCISES: &[CatalogExercise] = &[
    CatalogExercise {
        id: "ex_bench_press",
        name: "Bench Press",
        category: ExerciseCategory::Strength,
        equipment: &["Barbell"],
        description: "Lie on a flat bench and press the barbell up from your chest.",
        target_muscles: &["Chest", "Shoulders", "Triceps"],
        sets: Some(3),
        reps: Some(10),
        duration: None,
    },
    CatalogExercise {
        id: "ex_squat",
        name: "Squat",
        category: ExerciseCategory::Strength,
        equipment: &["Barbell"],
        description: "Stand with the barbell on your upper back and squat down until your thighs are parallel to the ground.",
        target_muscles: &["Legs", "Core"],
        sets: Some(3),
        reps: Some(8),
        duration: None,
    },
    CatalogExercise {
        id: "ex_deadlift",
        name: "Deadlift",
        category: ExerciseCategory::Strength,
        equipment: &["Barbell"],
        description: "Lift a barbell from the ground while keeping your back straight.",
        target_muscles: &["Back", "Legs", "Core"],
        sets: Some(3),
        reps: Some(8),
        duration: None,
    },
    CatalogExercise {
        id: "ex_pushup",
        name: "Push-up",
        category: ExerciseCategory::Bodyweight,
        equipment: &["Bodyweight"],
        description: "Perform a pushing motion with your body weight, keeping your core tight.",
        target_muscles: &["Chest", "Shoulders", "Triceps", "Core"],
        sets: Some(3),
        reps: Some(12),
        duration: None,
    },
    CatalogExercise {
        id: "ex_plank",
        name: "Plank",
        category: ExerciseCategory::Flexibility,
        equipment: &["Bodyweight"],
        description: "Hold a push-up position with your forearms on the ground.",
        target_muscles: &["Core"],
        sets: Some(3),
        reps: None,
        duration: Some(60),
    },
    CatalogExercise {
        id: "ex_running",
        name: "Running",
        category: ExerciseCategory::Cardio,
        equipment: &["Other"],
        description: "Run at a steady pace.",
        target_muscles: &["Legs", "Full Body"],
        sets: None,
        reps: None,
        duration: Some(1800),
    },
    CatalogExercise {
        id: "ex_burpee",
        name: "Burpee",
        category: ExerciseCategory::Hiit,
        equipment: &["Bodyweight"],
        description: "Squat, kick back into a plank, return and jump up explosively.",
        target_muscles: &["Full Body"],
        sets: Some(4),
        reps: None,
        duration: Some(30),
    },
];
