use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};

use crate::{CompletedWorkout, Exercise, ExerciseCategory, ExerciseID, exercise_name};

const MOST_FREQUENT_EXERCISES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    /// Number of exercise entries per category. Entries referencing unknown exercises are not counted.
    pub workouts_by_category: BTreeMap<ExerciseCategory, usize>,
    pub most_frequent_exercises: Vec<ExerciseFrequency>,
    pub average_workouts_per_week: f32,
    pub average_exercises_per_workout: f32,
    /// Sum of weight times reps over all sets.
    pub total_volume: f32,
    /// Total duration in seconds.
    pub total_duration: u64,
    pub personal_bests: BTreeMap<ExerciseID, PersonalBest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseFrequency {
    pub exercise_id: ExerciseID,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalBest {
    pub exercise_id: ExerciseID,
    pub name: String,
    pub weight: f32,
    pub date: DateTime<Utc>,
}

#[must_use]
pub fn calculate_workout_stats(
    workouts: &[CompletedWorkout],
    exercises: &[Exercise],
) -> WorkoutStats {
    calculate_workout_stats_at(workouts, exercises, Utc::now())
}

/// Aggregate statistics over all workouts as seen at `now`.
///
/// The most frequent exercises are ordered by count, descending. Exercises with equal counts
/// keep the order in which they first occur in `workouts`, which is the order given by the
/// caller and not necessarily chronological.
///
/// Personal bests are attributed to the earliest workout reaching the maximum weight.
#[must_use]
pub fn calculate_workout_stats_at(
    workouts: &[CompletedWorkout],
    exercises: &[Exercise],
    now: DateTime<Utc>,
) -> WorkoutStats {
    let categories = exercises
        .iter()
        .map(|e| (&e.id, e.category()))
        .collect::<HashMap<_, _>>();

    let mut chronological = workouts.iter().collect::<Vec<_>>();
    chronological.sort_by_key(|w| w.date);

    let mut stats = WorkoutStats {
        total_workouts: workouts.len(),
        ..WorkoutStats::default()
    };
    let mut frequency: Vec<(&ExerciseID, usize)> = vec![];
    let mut num_exercises: u32 = 0;

    for workout in &chronological {
        stats.total_duration += u64::from(workout.duration);

        for exercise in &workout.exercises {
            num_exercises += 1;
            stats.total_volume += exercise.volume();

            if let Some(weight) = exercise.max_weight() {
                let is_better = stats
                    .personal_bests
                    .get(&exercise.exercise_id)
                    .is_none_or(|best| weight > best.weight);
                if is_better {
                    stats.personal_bests.insert(
                        exercise.exercise_id.clone(),
                        PersonalBest {
                            exercise_id: exercise.exercise_id.clone(),
                            name: exercise_name(exercises, &exercise.exercise_id).to_string(),
                            weight,
                            date: workout.date,
                        },
                    );
                }
            }

            if let Some(category) = categories.get(&exercise.exercise_id) {
                *stats.workouts_by_category.entry(*category).or_default() += 1;
            }
        }
    }

    for exercise in workouts.iter().flat_map(|w| &w.exercises) {
        match frequency
            .iter_mut()
            .find(|(id, _)| **id == exercise.exercise_id)
        {
            Some((_, count)) => *count += 1,
            None => frequency.push((&exercise.exercise_id, 1)),
        }
    }
    frequency.sort_by(|a, b| b.1.cmp(&a.1));
    stats.most_frequent_exercises = frequency
        .into_iter()
        .take(MOST_FREQUENT_EXERCISES)
        .map(|(id, count)| ExerciseFrequency {
            exercise_id: id.clone(),
            name: exercise_name(exercises, id).to_string(),
            count,
        })
        .collect();

    if let Some(oldest) = chronological.first() {
        #[allow(clippy::cast_precision_loss)]
        let weeks = ((now - oldest.date).num_milliseconds() as f64
            / Duration::weeks(1).num_milliseconds() as f64)
            .ceil()
            .max(1.0);
        #[allow(clippy::cast_precision_loss)]
        let per_week = workouts.len() as f64 / weeks;
        stats.average_workouts_per_week = round_1(per_week);
        #[allow(clippy::cast_precision_loss)]
        let per_workout = f64::from(num_exercises) / workouts.len() as f64;
        stats.average_exercises_per_workout = round_1(per_workout);
    }

    stats
}

#[allow(clippy::cast_possible_truncation)]
fn round_1(value: f64) -> f32 {
    ((value * 10.0).round() / 10.0) as f32
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{CompletedExercise, ExerciseDraft, ExerciseSet, UNKNOWN_EXERCISE};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 29, 12, 0, 0).unwrap()
    }

    fn exercise(id: &str, name: &str, category: ExerciseCategory) -> Exercise {
        ExerciseDraft {
            name: name.to_string(),
            category: Some(category),
            target_muscles: vec!["Legs".to_string()],
            ..ExerciseDraft::default()
        }
        .into_exercise(id.into())
        .unwrap()
    }

    fn set(reps: u32, weight: Option<f32>) -> ExerciseSet {
        ExerciseSet {
            reps,
            weight,
            duration: None,
        }
    }

    fn workout(id: &str, days_ago: i64, exercises: &[(&str, Vec<ExerciseSet>)]) -> CompletedWorkout {
        CompletedWorkout {
            id: id.into(),
            template_id: None,
            name: id.to_string(),
            date: now() - Duration::days(days_ago),
            duration: 1800,
            exercises: exercises
                .iter()
                .map(|(exercise_id, sets)| CompletedExercise {
                    exercise_id: (*exercise_id).into(),
                    sets: sets.clone(),
                    notes: String::new(),
                })
                .collect(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_calculate_workout_stats_empty() {
        assert_eq!(
            calculate_workout_stats_at(&[], &[], now()),
            WorkoutStats::default()
        );
    }

    #[test]
    fn test_calculate_workout_stats() {
        let exercises = vec![
            exercise("squat", "Squat", ExerciseCategory::Strength),
            exercise("run", "Running", ExerciseCategory::Cardio),
        ];
        let workouts = vec![
            workout(
                "w2",
                3,
                &[
                    ("squat", vec![set(5, Some(100.0)), set(5, Some(90.0))]),
                    ("gone", vec![set(10, None)]),
                ],
            ),
            workout(
                "w1",
                10,
                &[("squat", vec![set(5, Some(100.0))]), ("run", vec![])],
            ),
        ];

        let stats = calculate_workout_stats_at(&workouts, &exercises, now());

        assert_eq!(stats.total_workouts, 2);
        assert_eq!(
            stats.workouts_by_category,
            BTreeMap::from([(ExerciseCategory::Strength, 2), (ExerciseCategory::Cardio, 1)])
        );
        assert_eq!(
            stats.most_frequent_exercises,
            vec![
                ExerciseFrequency {
                    exercise_id: "squat".into(),
                    name: "Squat".to_string(),
                    count: 2,
                },
                ExerciseFrequency {
                    exercise_id: "gone".into(),
                    name: UNKNOWN_EXERCISE.to_string(),
                    count: 1,
                },
                ExerciseFrequency {
                    exercise_id: "run".into(),
                    name: "Running".to_string(),
                    count: 1,
                },
            ]
        );
        assert_eq!(stats.average_workouts_per_week, 1.0);
        assert_eq!(stats.average_exercises_per_workout, 2.0);
        assert_eq!(stats.total_volume, 1450.0);
        assert_eq!(stats.total_duration, 3600);
        assert_eq!(
            stats.personal_bests,
            BTreeMap::from([(
                ExerciseID::from("squat"),
                PersonalBest {
                    exercise_id: "squat".into(),
                    name: "Squat".to_string(),
                    weight: 100.0,
                    date: now() - Duration::days(10),
                }
            )])
        );
    }

    #[test]
    fn test_most_frequent_exercises_limited() {
        let workouts = vec![workout(
            "w",
            0,
            &[
                ("a", vec![]),
                ("b", vec![]),
                ("c", vec![]),
                ("d", vec![]),
                ("e", vec![]),
                ("f", vec![]),
                ("f", vec![]),
            ],
        )];

        let stats = calculate_workout_stats_at(&workouts, &[], now());

        assert_eq!(
            stats
                .most_frequent_exercises
                .iter()
                .map(|f| (f.exercise_id.to_string(), f.count))
                .collect::<Vec<_>>(),
            vec![
                ("f".to_string(), 2),
                ("a".to_string(), 1),
                ("b".to_string(), 1),
                ("c".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_most_frequent_exercises_ties_keep_input_order() {
        let workouts = vec![
            workout("recent", 1, &[("b", vec![]), ("c", vec![])]),
            workout("old", 20, &[("a", vec![]), ("c", vec![])]),
        ];

        let stats = calculate_workout_stats_at(&workouts, &[], now());

        assert_eq!(
            stats
                .most_frequent_exercises
                .iter()
                .map(|f| (f.exercise_id.to_string(), f.count))
                .collect::<Vec<_>>(),
            vec![
                ("c".to_string(), 2),
                ("b".to_string(), 1),
                ("a".to_string(), 1),
            ]
        );
    }

    #[rstest]
    #[case(&[0], 1.0)]
    #[case(&[0, 1, 2], 3.0)]
    #[case(&[0, 20], 0.7)]
    #[case(&[0, 28], 0.5)]
    #[case(&[0, 29], 0.4)]
    fn test_average_workouts_per_week(#[case] days_ago: &[i64], #[case] expected: f32) {
        let workouts = days_ago
            .iter()
            .map(|d| workout(&d.to_string(), *d, &[]))
            .collect::<Vec<_>>();

        assert_eq!(
            calculate_workout_stats_at(&workouts, &[], now()).average_workouts_per_week,
            expected
        );
    }
}
