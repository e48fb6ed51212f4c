use chrono::Utc;
use log::{debug, error};

use crate::{
    AuthError, AuthService, BackupRepository, BackupService, CompletedWorkout,
    CompletedWorkoutDraft, CompletedWorkoutRepository, CompletedWorkoutService, CreateError,
    Credentials, DeleteError, Email, Exercise, ExerciseDraft, ExerciseID, ExerciseRepository,
    ExerciseService, HealthMetrics, ImportError, ImportSummary, Name, PersonalStats,
    PersonalStatsDraft, PersonalStatsRepository, PersonalStatsService, ReadError, Registration,
    Session, SessionRepository, SessionToken, Sex, StorageError, TemplateID, UpdateError, User,
    UserID, UserRepository, ValidationError, WorkoutID, WorkoutStats, WorkoutTemplate,
    WorkoutTemplateDraft, WorkoutTemplateRepository, WorkoutTemplateService, calculate_workout_stats,
    catalog, generate_id, hash_password, health_metrics, validate_registration, verify_password,
};

/// Entry point of the application layer.
///
/// A single instance is created at start-up and shared by all views.
pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

impl<R> Service<R>
where
    R: ExerciseRepository + CompletedWorkoutRepository,
{
    pub async fn get_workout_stats(&self) -> Result<WorkoutStats, ReadError> {
        let workouts = self.get_completed_workouts().await?;
        let exercises = self.get_exercises().await?;
        Ok(calculate_workout_stats(&workouts, &exercises))
    }
}

impl<R> Service<R>
where
    R: WorkoutTemplateRepository,
{
    /// Prepare a new workout from a template. The workout is not stored.
    pub async fn start_workout(&self, id: &TemplateID) -> Result<CompletedWorkoutDraft, ReadError> {
        let template = self.get_workout_template(id).await?;
        Ok(template.start(Utc::now()))
    }
}

impl<R> Service<R>
where
    R: PersonalStatsRepository,
{
    pub async fn get_health_metrics(&self, sex: Sex) -> Result<Option<HealthMetrics>, ReadError> {
        let stats = self.get_personal_stats().await?;
        Ok(health_metrics(&stats, sex))
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(StorageError::Unavailable(_)) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn get_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError> {
        log_on_error!(
            self.repository.read_exercise(id),
            ReadError,
            "get",
            "exercise"
        )
    }

    async fn create_exercise(&self, draft: ExerciseDraft) -> Result<Exercise, CreateError> {
        log_on_error!(
            async {
                let exercise = draft.into_exercise(generate_id("exercise").into())?;
                self.repository.create_exercise(exercise).await
            },
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn create_exercise_from_catalog(&self, id: &str) -> Result<Exercise, CreateError> {
        log_on_error!(
            async {
                let Some(entry) = catalog::find(id) else {
                    return Err(CreateError::Other(
                        format!("unknown catalog exercise \"{id}\"").into(),
                    ));
                };
                let exercise = entry.draft().into_exercise(generate_id("exercise").into())?;
                self.repository.create_exercise(exercise).await
            },
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn replace_exercise(
        &self,
        id: ExerciseID,
        draft: ExerciseDraft,
    ) -> Result<Exercise, UpdateError> {
        log_on_error!(
            async {
                let exercise = draft.into_exercise(id)?;
                self.repository.replace_exercise(exercise).await
            },
            UpdateError,
            "replace",
            "exercise"
        )
    }

    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.repository.delete_exercise(id),
            DeleteError,
            "delete",
            "exercise"
        )
    }
}

impl<R: WorkoutTemplateRepository> WorkoutTemplateService for Service<R> {
    async fn get_workout_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError> {
        log_on_error!(
            self.repository.read_workout_templates(),
            ReadError,
            "get",
            "workout templates"
        )
    }

    async fn get_workout_template(&self, id: &TemplateID) -> Result<WorkoutTemplate, ReadError> {
        log_on_error!(
            self.repository.read_workout_template(id),
            ReadError,
            "get",
            "workout template"
        )
    }

    async fn create_workout_template(
        &self,
        draft: WorkoutTemplateDraft,
    ) -> Result<WorkoutTemplate, CreateError> {
        log_on_error!(
            async {
                let template = draft.into_workout_template(generate_id("template").into())?;
                self.repository.create_workout_template(template).await
            },
            CreateError,
            "create",
            "workout template"
        )
    }

    async fn replace_workout_template(
        &self,
        id: TemplateID,
        draft: WorkoutTemplateDraft,
    ) -> Result<WorkoutTemplate, UpdateError> {
        log_on_error!(
            async {
                let template = draft.into_workout_template(id)?;
                self.repository.replace_workout_template(template).await
            },
            UpdateError,
            "replace",
            "workout template"
        )
    }

    async fn set_workout_template_favorite(
        &self,
        id: TemplateID,
        favorite: bool,
    ) -> Result<WorkoutTemplate, UpdateError> {
        log_on_error!(
            async {
                let mut template = self.repository.read_workout_template(&id).await?;
                template.favorite = favorite;
                self.repository.replace_workout_template(template).await
            },
            UpdateError,
            "update",
            "workout template"
        )
    }

    async fn delete_workout_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError> {
        log_on_error!(
            self.repository.delete_workout_template(id),
            DeleteError,
            "delete",
            "workout template"
        )
    }
}

impl<R: CompletedWorkoutRepository> CompletedWorkoutService for Service<R> {
    async fn get_completed_workouts(&self) -> Result<Vec<CompletedWorkout>, ReadError> {
        log_on_error!(
            self.repository.read_completed_workouts(),
            ReadError,
            "get",
            "completed workouts"
        )
    }

    async fn get_completed_workout(&self, id: &WorkoutID) -> Result<CompletedWorkout, ReadError> {
        log_on_error!(
            self.repository.read_completed_workout(id),
            ReadError,
            "get",
            "completed workout"
        )
    }

    async fn create_completed_workout(
        &self,
        draft: CompletedWorkoutDraft,
    ) -> Result<CompletedWorkout, CreateError> {
        log_on_error!(
            async {
                let workout = draft.into_completed_workout(generate_id("workout").into())?;
                self.repository.create_completed_workout(workout).await
            },
            CreateError,
            "create",
            "completed workout"
        )
    }

    async fn replace_completed_workout(
        &self,
        id: WorkoutID,
        draft: CompletedWorkoutDraft,
    ) -> Result<CompletedWorkout, UpdateError> {
        log_on_error!(
            async {
                let workout = draft.into_completed_workout(id)?;
                self.repository.replace_completed_workout(workout).await
            },
            UpdateError,
            "replace",
            "completed workout"
        )
    }

    async fn delete_completed_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError> {
        log_on_error!(
            self.repository.delete_completed_workout(id),
            DeleteError,
            "delete",
            "completed workout"
        )
    }
}

impl<R: PersonalStatsRepository> PersonalStatsService for Service<R> {
    async fn get_personal_stats(&self) -> Result<Vec<PersonalStats>, ReadError> {
        log_on_error!(
            self.repository.read_personal_stats(),
            ReadError,
            "get",
            "personal stats"
        )
    }

    async fn create_personal_stats(
        &self,
        draft: PersonalStatsDraft,
    ) -> Result<PersonalStats, CreateError> {
        log_on_error!(
            async {
                let stats = draft.into_personal_stats(
                    generate_id("stats").into(),
                    Utc::now().timestamp_millis(),
                )?;
                self.repository.create_personal_stats(stats).await
            },
            CreateError,
            "create",
            "personal stats"
        )
    }
}

impl<R: UserRepository + SessionRepository> AuthService for Service<R> {
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        log_on_error!(
            async {
                let errors = validate_registration(&registration);
                if !errors.is_empty() {
                    return Err(AuthError::Invalid(ValidationError(errors)));
                }
                let user = User {
                    email: Email::new(&registration.email),
                    id: UserID::random(),
                    name: Name::new(&registration.name)
                        .map_err(|err| ValidationError(vec![err.to_string()]))?,
                    password_hash: hash_password(&registration.password)?,
                };
                self.repository
                    .create_user(user)
                    .await
                    .map_err(|err| match err {
                        CreateError::Conflict => AuthError::Conflict,
                        CreateError::Invalid(invalid) => AuthError::Invalid(invalid),
                        CreateError::Storage(storage) => AuthError::Storage(storage),
                        CreateError::Other(other) => AuthError::Other(other),
                    })
            },
            AuthError,
            "register",
            "user"
        )
    }

    async fn login(&self, credentials: Credentials) -> Result<(User, Session), AuthError> {
        log_on_error!(
            async {
                if credentials.email.trim().is_empty() || credentials.password.is_empty() {
                    return Err(AuthError::Invalid(ValidationError(vec![
                        "Email and password are required".to_string(),
                    ])));
                }
                let email = Email::new(&credentials.email);
                let user = self
                    .repository
                    .read_user(&email)
                    .await
                    .map_err(|err| auth_error(err, AuthError::InvalidCredentials))?;
                if !verify_password(&credentials.password, &user.password_hash) {
                    return Err(AuthError::InvalidCredentials);
                }
                let session = self
                    .repository
                    .create_session(Session::new(email, credentials.remember, Utc::now()))
                    .await
                    .map_err(|err| match err {
                        CreateError::Storage(storage) => AuthError::Storage(storage),
                        err => AuthError::Other(err.to_string().into()),
                    })?;
                Ok((user, session))
            },
            AuthError,
            "log in",
            "user"
        )
    }

    async fn get_current_user(&self, token: &SessionToken) -> Result<User, AuthError> {
        let session = self
            .repository
            .read_session(token)
            .await
            .map_err(|err| auth_error(err, AuthError::NoSession))?;
        if session.is_expired_at(Utc::now()) {
            debug!("session expired");
            if let Err(err) = self.repository.delete_session(session.token).await {
                error!("failed to delete expired session: {err}");
            }
            return Err(AuthError::SessionExpired);
        }
        self.repository
            .read_user(&session.email)
            .await
            .map_err(|err| auth_error(err, AuthError::NoSession))
    }

    async fn logout(&self, token: SessionToken) -> Result<(), AuthError> {
        log_on_error!(
            async {
                match self.repository.delete_session(token).await {
                    Ok(_) | Err(DeleteError::NotFound) => Ok(()),
                    Err(DeleteError::Storage(storage)) => Err(AuthError::Storage(storage)),
                    Err(DeleteError::Other(other)) => Err(AuthError::Other(other)),
                }
            },
            AuthError,
            "log out",
            "user"
        )
    }
}

fn auth_error(err: ReadError, not_found: AuthError) -> AuthError {
    match err {
        ReadError::NotFound => not_found,
        ReadError::Storage(storage) => AuthError::Storage(storage),
        ReadError::Other(other) => AuthError::Other(other),
    }
}

impl<R: BackupRepository> BackupService for Service<R> {
    async fn export_backup(&self) -> Result<String, ReadError> {
        log_on_error!(
            self.repository.export_backup(),
            ReadError,
            "export",
            "backup"
        )
    }

    async fn import_backup(&self, document: &str) -> Result<ImportSummary, ImportError> {
        log_on_error!(
            self.repository.import_backup(document),
            ImportError,
            "import",
            "backup"
        )
    }
}
