use serde::{Deserialize, Serialize};
use workout_tracker_domain::{CompletedWorkout, DEFAULT_BODY_WEIGHT, WeightUnit};

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(with = "WeightUnitDef", default)]
    pub weight_unit: WeightUnit,
    /// Body weight in kg used for calorie estimates.
    #[serde(default)]
    pub body_weight: Option<f32>,
}

impl Settings {
    #[must_use]
    pub fn body_weight(&self) -> f32 {
        self.body_weight.unwrap_or(DEFAULT_BODY_WEIGHT)
    }

    #[must_use]
    pub fn estimated_calories(&self, workout: &CompletedWorkout) -> u32 {
        workout.estimated_calories(self.body_weight)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "WeightUnit", rename_all = "lowercase")]
enum WeightUnitDef {
    Kg,
    Lbs,
}
