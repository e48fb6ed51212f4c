use serde::de::IgnoredAny;
use workout_tracker_domain as domain;

use crate::{Backend, Index, LocalStore, Store, records};

impl<B: Backend> LocalStore<B> {
    async fn exists(&self, store: Store, key: &str) -> Result<bool, domain::ReadError> {
        Ok(self.backend.get::<IgnoredAny>(store, key).await?.is_some())
    }
}

fn convert<R, D>(records: Vec<R>) -> Result<Vec<D>, domain::ReadError>
where
    D: TryFrom<R, Error = records::RecordError>,
{
    records
        .into_iter()
        .map(|r| D::try_from(r).map_err(|err| domain::ReadError::Other(Box::new(err))))
        .collect()
}

fn convert_one<R, D>(record: Option<R>) -> Result<D, domain::ReadError>
where
    D: TryFrom<R, Error = records::RecordError>,
{
    D::try_from(record.ok_or(domain::ReadError::NotFound)?)
        .map_err(|err| domain::ReadError::Other(Box::new(err)))
}

impl<B: Backend> domain::ExerciseRepository for LocalStore<B> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        convert(
            self.backend
                .get_all_by_index::<records::Exercise>(Store::Exercises, Index::Name)
                .await?,
        )
    }

    async fn read_exercise(
        &self,
        id: &domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        convert_one(
            self.backend
                .get::<records::Exercise>(Store::Exercises, id)
                .await?,
        )
    }

    async fn create_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        self.backend
            .add(Store::Exercises, &records::Exercise::from(&exercise))
            .await?;
        Ok(exercise)
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        if !self.exists(Store::Exercises, &exercise.id).await? {
            return Err(domain::UpdateError::NotFound);
        }
        self.backend
            .put(Store::Exercises, &records::Exercise::from(&exercise))
            .await?;
        Ok(exercise)
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        if !self.exists(Store::Exercises, &id).await? {
            return Err(domain::DeleteError::NotFound);
        }
        self.backend.delete(Store::Exercises, &id).await?;
        Ok(id)
    }
}

impl<B: Backend> domain::WorkoutTemplateRepository for LocalStore<B> {
    async fn read_workout_templates(
        &self,
    ) -> Result<Vec<domain::WorkoutTemplate>, domain::ReadError> {
        convert(
            self.backend
                .get_all::<records::WorkoutTemplate>(Store::WorkoutTemplates)
                .await?,
        )
    }

    async fn read_workout_template(
        &self,
        id: &domain::TemplateID,
    ) -> Result<domain::WorkoutTemplate, domain::ReadError> {
        convert_one(
            self.backend
                .get::<records::WorkoutTemplate>(Store::WorkoutTemplates, id)
                .await?,
        )
    }

    async fn create_workout_template(
        &self,
        template: domain::WorkoutTemplate,
    ) -> Result<domain::WorkoutTemplate, domain::CreateError> {
        self.backend
            .add(
                Store::WorkoutTemplates,
                &records::WorkoutTemplate::from(&template),
            )
            .await?;
        Ok(template)
    }

    async fn replace_workout_template(
        &self,
        template: domain::WorkoutTemplate,
    ) -> Result<domain::WorkoutTemplate, domain::UpdateError> {
        if !self.exists(Store::WorkoutTemplates, &template.id).await? {
            return Err(domain::UpdateError::NotFound);
        }
        self.backend
            .put(
                Store::WorkoutTemplates,
                &records::WorkoutTemplate::from(&template),
            )
            .await?;
        Ok(template)
    }

    async fn delete_workout_template(
        &self,
        id: domain::TemplateID,
    ) -> Result<domain::TemplateID, domain::DeleteError> {
        if !self.exists(Store::WorkoutTemplates, &id).await? {
            return Err(domain::DeleteError::NotFound);
        }
        self.backend.delete(Store::WorkoutTemplates, &id).await?;
        Ok(id)
    }
}

impl<B: Backend> domain::CompletedWorkoutRepository for LocalStore<B> {
    async fn read_completed_workouts(
        &self,
    ) -> Result<Vec<domain::CompletedWorkout>, domain::ReadError> {
        convert(
            self.backend
                .get_all_by_index::<records::CompletedWorkout>(Store::CompletedWorkouts, Index::Date)
                .await?,
        )
    }

    async fn read_completed_workout(
        &self,
        id: &domain::WorkoutID,
    ) -> Result<domain::CompletedWorkout, domain::ReadError> {
        convert_one(
            self.backend
                .get::<records::CompletedWorkout>(Store::CompletedWorkouts, id)
                .await?,
        )
    }

    async fn create_completed_workout(
        &self,
        workout: domain::CompletedWorkout,
    ) -> Result<domain::CompletedWorkout, domain::CreateError> {
        self.backend
            .add(
                Store::CompletedWorkouts,
                &records::CompletedWorkout::from(&workout),
            )
            .await?;
        Ok(workout)
    }

    async fn replace_completed_workout(
        &self,
        workout: domain::CompletedWorkout,
    ) -> Result<domain::CompletedWorkout, domain::UpdateError> {
        if !self.exists(Store::CompletedWorkouts, &workout.id).await? {
            return Err(domain::UpdateError::NotFound);
        }
        self.backend
            .put(
                Store::CompletedWorkouts,
                &records::CompletedWorkout::from(&workout),
            )
            .await?;
        Ok(workout)
    }

    async fn delete_completed_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        if !self.exists(Store::CompletedWorkouts, &id).await? {
            return Err(domain::DeleteError::NotFound);
        }
        self.backend.delete(Store::CompletedWorkouts, &id).await?;
        Ok(id)
    }
}

impl<B: Backend> domain::PersonalStatsRepository for LocalStore<B> {
    async fn read_personal_stats(&self) -> Result<Vec<domain::PersonalStats>, domain::ReadError> {
        let mut stats: Vec<domain::PersonalStats> = convert(
            self.backend
                .get_all::<records::PersonalStats>(Store::PersonalStats)
                .await?,
        )?;
        domain::sort_newest_first(&mut stats);
        Ok(stats)
    }

    async fn create_personal_stats(
        &self,
        stats: domain::PersonalStats,
    ) -> Result<domain::PersonalStats, domain::CreateError> {
        self.backend
            .add(Store::PersonalStats, &records::PersonalStats::from(&stats))
            .await?;
        Ok(stats)
    }
}

impl<B: Backend> domain::UserRepository for LocalStore<B> {
    async fn read_user(&self, email: &domain::Email) -> Result<domain::User, domain::ReadError> {
        convert_one(self.backend.get::<records::User>(Store::Users, email).await?)
    }

    async fn create_user(&self, user: domain::User) -> Result<domain::User, domain::CreateError> {
        self.backend
            .add(Store::Users, &records::User::from(&user))
            .await?;
        Ok(user)
    }
}

impl<B: Backend> domain::SessionRepository for LocalStore<B> {
    async fn read_session(
        &self,
        token: &domain::SessionToken,
    ) -> Result<domain::Session, domain::ReadError> {
        self.backend
            .get::<records::Session>(Store::Sessions, &token.to_string())
            .await?
            .map(domain::Session::from)
            .ok_or(domain::ReadError::NotFound)
    }

    async fn create_session(
        &self,
        session: domain::Session,
    ) -> Result<domain::Session, domain::CreateError> {
        self.backend
            .add(Store::Sessions, &records::Session::from(&session))
            .await?;
        Ok(session)
    }

    async fn delete_session(
        &self,
        token: domain::SessionToken,
    ) -> Result<domain::SessionToken, domain::DeleteError> {
        let key = token.to_string();
        if !self.exists(Store::Sessions, &key).await? {
            return Err(domain::DeleteError::NotFound);
        }
        self.backend.delete(Store::Sessions, &key).await?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use workout_tracker_domain::{
        CompletedWorkoutRepository, ExerciseRepository, PersonalStatsRepository,
        SessionRepository, UserRepository, WorkoutTemplateRepository,
    };

    use super::*;
    use crate::{
        memory::MemoryBackend,
        tests::data::{
            EXERCISE, EXERCISE_2, EXERCISES, PERSONAL_STATS, PERSONAL_STATS_2, SESSION, TEMPLATE,
            USER, WORKOUT, WORKOUT_2, WORKOUTS,
        },
    };

    fn store() -> LocalStore<MemoryBackend> {
        LocalStore::new(MemoryBackend::new())
    }

    #[test]
    fn test_read_exercises_ordered_by_name() {
        let store = store();
        block_on(store.create_exercise(EXERCISE_2.clone())).unwrap();
        block_on(store.create_exercise(EXERCISE.clone())).unwrap();

        assert_eq!(block_on(store.read_exercises()).unwrap(), EXERCISES.clone());
    }

    #[test]
    fn test_read_exercise_not_found() {
        assert!(matches!(
            block_on(store().read_exercise(&EXERCISE.id)),
            Err(domain::ReadError::NotFound)
        ));
    }

    #[test]
    fn test_create_exercise_conflict() {
        let store = store();
        block_on(store.create_exercise(EXERCISE.clone())).unwrap();

        assert!(matches!(
            block_on(store.create_exercise(EXERCISE.clone())),
            Err(domain::CreateError::Conflict)
        ));
    }

    #[test]
    fn test_replace_exercise() {
        let store = store();
        block_on(store.create_exercise(EXERCISE.clone())).unwrap();
        let mut exercise = EXERCISE.clone();
        exercise.description = "Lower the bar to the chest.".to_string();

        assert_eq!(
            block_on(store.replace_exercise(exercise.clone())).unwrap(),
            exercise
        );
        assert_eq!(block_on(store.read_exercise(&EXERCISE.id)).unwrap(), exercise);
    }

    #[test]
    fn test_replace_exercise_not_found() {
        assert!(matches!(
            block_on(store().replace_exercise(EXERCISE.clone())),
            Err(domain::UpdateError::NotFound)
        ));
    }

    #[test]
    fn test_delete_exercise() {
        let store = store();
        block_on(store.create_exercise(EXERCISE.clone())).unwrap();

        assert_eq!(
            block_on(store.delete_exercise(EXERCISE.id.clone())).unwrap(),
            EXERCISE.id
        );
        assert!(matches!(
            block_on(store.delete_exercise(EXERCISE.id.clone())),
            Err(domain::DeleteError::NotFound)
        ));
    }

    #[test]
    fn test_read_invalid_exercise() {
        let store = store();
        block_on(store.backend().add(
            Store::Exercises,
            &json!({ "id": "exercise_x", "name": "X", "category": "yoga", "targetMuscles": ["Core"] }),
        ))
        .unwrap();

        assert!(matches!(
            block_on(store.read_exercises()),
            Err(domain::ReadError::Other(_))
        ));
    }

    #[test]
    fn test_workout_templates() {
        let store = store();
        block_on(store.create_workout_template(TEMPLATE.clone())).unwrap();

        assert_eq!(
            block_on(store.read_workout_templates()).unwrap(),
            vec![TEMPLATE.clone()]
        );

        let mut template = TEMPLATE.clone();
        template.favorite = false;
        block_on(store.replace_workout_template(template.clone())).unwrap();

        assert_eq!(
            block_on(store.read_workout_template(&TEMPLATE.id)).unwrap(),
            template
        );

        block_on(store.delete_workout_template(TEMPLATE.id.clone())).unwrap();

        assert!(block_on(store.read_workout_templates()).unwrap().is_empty());
    }

    #[test]
    fn test_read_completed_workouts_ordered_by_date() {
        let store = store();
        block_on(store.create_completed_workout(WORKOUT.clone())).unwrap();
        block_on(store.create_completed_workout(WORKOUT_2.clone())).unwrap();

        assert_eq!(
            block_on(store.read_completed_workouts()).unwrap(),
            vec![WORKOUT_2.clone(), WORKOUT.clone()]
        );
    }

    #[test]
    fn test_read_completed_workouts_within_same_second() {
        let store = store();
        let later = domain::CompletedWorkout {
            id: "workout_3".into(),
            date: WORKOUT.date + chrono::Duration::milliseconds(500),
            ..WORKOUT.clone()
        };
        block_on(store.create_completed_workout(later.clone())).unwrap();
        block_on(store.create_completed_workout(WORKOUT.clone())).unwrap();

        assert_eq!(
            block_on(store.read_completed_workouts()).unwrap(),
            vec![WORKOUT.clone(), later]
        );
    }

    #[test]
    fn test_replace_and_delete_completed_workout() {
        let store = store();
        for workout in WORKOUTS.iter() {
            block_on(store.create_completed_workout(workout.clone())).unwrap();
        }
        let mut workout = WORKOUT.clone();
        workout.notes = "Tired".to_string();

        block_on(store.replace_completed_workout(workout.clone())).unwrap();
        block_on(store.delete_completed_workout(WORKOUT_2.id.clone())).unwrap();

        assert_eq!(block_on(store.read_completed_workouts()).unwrap(), vec![workout]);
        assert!(matches!(
            block_on(store.replace_completed_workout(WORKOUT_2.clone())),
            Err(domain::UpdateError::NotFound)
        ));
    }

    #[test]
    fn test_read_personal_stats_newest_first() {
        let store = store();
        block_on(store.create_personal_stats(PERSONAL_STATS.clone())).unwrap();
        block_on(store.create_personal_stats(PERSONAL_STATS_2.clone())).unwrap();

        assert_eq!(
            block_on(store.read_personal_stats()).unwrap(),
            vec![PERSONAL_STATS_2.clone(), PERSONAL_STATS.clone()]
        );
    }

    #[test]
    fn test_users() {
        let store = store();

        assert!(matches!(
            block_on(store.read_user(&USER.email)),
            Err(domain::ReadError::NotFound)
        ));

        block_on(store.create_user(USER.clone())).unwrap();

        assert_eq!(block_on(store.read_user(&USER.email)).unwrap(), USER.clone());
        assert!(matches!(
            block_on(store.create_user(USER.clone())),
            Err(domain::CreateError::Conflict)
        ));
    }

    #[test]
    fn test_sessions() {
        let store = store();
        block_on(store.create_session(SESSION.clone())).unwrap();

        assert_eq!(
            block_on(store.read_session(&SESSION.token)).unwrap(),
            SESSION.clone()
        );
        assert_eq!(
            block_on(store.delete_session(SESSION.token)).unwrap(),
            SESSION.token
        );
        assert!(matches!(
            block_on(store.read_session(&SESSION.token)),
            Err(domain::ReadError::NotFound)
        ));
    }

    #[test]
    fn test_unavailable() {
        let store = LocalStore::new(MemoryBackend::unavailable("blocked"));

        assert!(matches!(
            block_on(store.read_exercises()),
            Err(domain::ReadError::Storage(domain::StorageError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_delete_referenced_exercise() {
        let service = domain::Service::new(store());
        block_on(store_all(service.repository()));

        block_on(service.repository().delete_exercise(EXERCISE.id.clone())).unwrap();

        let exercises = block_on(service.repository().read_exercises()).unwrap();
        let workouts = block_on(service.repository().read_completed_workouts()).unwrap();
        assert_eq!(workouts.len(), 2);
        assert_eq!(
            domain::exercise_name(&exercises, &workouts[1].exercises[0].exercise_id),
            domain::UNKNOWN_EXERCISE
        );

        let stats = block_on(service.get_workout_stats()).unwrap();
        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.personal_bests[&EXERCISE.id].name, domain::UNKNOWN_EXERCISE);
    }

    async fn store_all(store: &LocalStore<MemoryBackend>) {
        for exercise in EXERCISES.iter() {
            store.create_exercise(exercise.clone()).await.unwrap();
        }
        for workout in WORKOUTS.iter() {
            store.create_completed_workout(workout.clone()).await.unwrap();
        }
    }
}
