use chrono::NaiveDate;
use derive_more::{Deref, Display};

use crate::{CreateError, ReadError, ValidationError};

#[allow(async_fn_in_trait)]
pub trait PersonalStatsService {
    async fn get_personal_stats(&self) -> Result<Vec<PersonalStats>, ReadError>;
    async fn create_personal_stats(
        &self,
        draft: PersonalStatsDraft,
    ) -> Result<PersonalStats, CreateError>;
}

#[allow(async_fn_in_trait)]
pub trait PersonalStatsRepository {
    /// Read all measurements, newest first.
    async fn read_personal_stats(&self) -> Result<Vec<PersonalStats>, ReadError>;
    async fn create_personal_stats(
        &self,
        stats: PersonalStats,
    ) -> Result<PersonalStats, CreateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalStats {
    pub id: PersonalStatsID,
    pub date: NaiveDate,
    /// Weight in kg.
    pub weight: f32,
    /// Height in cm.
    pub height: f32,
    pub age: u32,
    pub body_fat: Option<f32>,
    pub notes: Option<String>,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: i64,
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonalStatsID(String);

impl From<String> for PersonalStatsID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PersonalStatsID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalStatsDraft {
    pub date: NaiveDate,
    pub weight: f32,
    pub height: f32,
    pub age: u32,
    pub body_fat: Option<f32>,
    pub notes: Option<String>,
}

impl PersonalStatsDraft {
    pub fn into_personal_stats(
        self,
        id: PersonalStatsID,
        created_at: i64,
    ) -> Result<PersonalStats, ValidationError> {
        let errors = validate_personal_stats(&self);
        if !errors.is_empty() {
            return Err(ValidationError(errors));
        }

        Ok(PersonalStats {
            id,
            date: self.date,
            weight: self.weight,
            height: self.height,
            age: self.age,
            body_fat: self.body_fat,
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            created_at,
        })
    }
}

#[must_use]
pub fn validate_personal_stats(stats: &PersonalStatsDraft) -> Vec<String> {
    let mut errors = vec![];

    if !is_positive(stats.weight) {
        errors.push("Weight must be a positive number".to_string());
    }

    if !is_positive(stats.height) {
        errors.push("Height must be a positive number".to_string());
    }

    if stats.age == 0 {
        errors.push("Age must be a positive number".to_string());
    }

    if let Some(body_fat) = stats.body_fat {
        if !(0.0..=100.0).contains(&body_fat) {
            errors.push("Body fat must be between 0 and 100 percent".to_string());
        }
    }

    errors
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Order measurements newest first, by date and then by creation time.
pub fn sort_newest_first(stats: &mut [PersonalStats]) {
    stats.sort_by(|a, b| (b.date, b.created_at).cmp(&(a.date, a.created_at)));
}
