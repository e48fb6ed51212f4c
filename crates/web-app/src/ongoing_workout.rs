use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use workout_tracker_domain::{CompletedWorkoutDraft, WorkoutTemplate};

#[allow(async_fn_in_trait)]
pub trait OngoingWorkoutService {
    async fn get_ongoing_workout(&self) -> Result<Option<OngoingWorkout>, String>;
    async fn set_ongoing_workout(&self, ongoing_workout: Option<OngoingWorkout>)
    -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait OngoingWorkoutRepository {
    async fn read_ongoing_workout(&self) -> Result<Option<OngoingWorkout>, String>;
    async fn write_ongoing_workout(
        &self,
        ongoing_workout: Option<OngoingWorkout>,
    ) -> Result<(), String>;
}

/// Workout currently being recorded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OngoingWorkout {
    pub template_id: Option<String>,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub exercise_idx: usize,
    pub timer_state: TimerState,
}

/// Elapsed workout time, excluding pauses.
///
/// Accumulated times are in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum TimerState {
    Running {
        since: DateTime<Utc>,
        accumulated: i64,
    },
    Paused {
        accumulated: i64,
    },
}

impl OngoingWorkout {
    #[must_use]
    pub fn new(name: &str, now: DateTime<Utc>) -> Self {
        Self {
            template_id: None,
            name: name.to_string(),
            start_time: now,
            exercise_idx: 0,
            timer_state: TimerState::Running {
                since: now,
                accumulated: 0,
            },
        }
    }

    #[must_use]
    pub fn from_template(template: &WorkoutTemplate, now: DateTime<Utc>) -> Self {
        Self {
            template_id: Some(template.id.to_string()),
            ..Self::new(template.name.as_str(), now)
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.timer_state, TimerState::Running { .. })
    }

    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        match self.timer_state {
            TimerState::Running { since, accumulated } => {
                Duration::milliseconds(accumulated) + (now - since).max(Duration::zero())
            }
            TimerState::Paused { accumulated } => Duration::milliseconds(accumulated),
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.is_running() {
            self.timer_state = TimerState::Paused {
                accumulated: self.elapsed(now).num_milliseconds(),
            };
        }
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if let TimerState::Paused { accumulated } = self.timer_state {
            self.timer_state = TimerState::Running {
                since: now,
                accumulated,
            };
        }
    }

    /// Draft of the completed workout, with the elapsed time as duration.
    ///
    /// `template` is used to pre-fill the sets if it is the template the workout was started
    /// from.
    #[must_use]
    pub fn finish(
        &self,
        template: Option<&WorkoutTemplate>,
        now: DateTime<Utc>,
    ) -> CompletedWorkoutDraft {
        let mut draft = match template {
            Some(template) if self.template_id.as_deref() == Some(template.id.as_str()) => {
                template.start(self.start_time)
            }
            _ => CompletedWorkoutDraft::new(&self.name, self.start_time),
        };
        draft.duration = u32::try_from(self.elapsed(now).num_seconds()).unwrap_or(u32::MAX);
        draft
    }
}
