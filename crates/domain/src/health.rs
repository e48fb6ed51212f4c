use crate::PersonalStats;

#[derive(strum::Display, strum::EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

#[derive(strum::Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    #[strum(serialize = "Normal weight")]
    NormalWeight,
    Overweight,
    Obese,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthMetrics {
    pub bmi: f32,
    pub bmi_category: BmiCategory,
    pub bmr: i32,
    pub ideal_weight: f32,
}

impl HealthMetrics {
    #[must_use]
    pub fn new(stats: &PersonalStats, sex: Sex) -> Self {
        let bmi = calculate_bmi(stats.weight, stats.height);
        Self {
            bmi,
            bmi_category: bmi_category(bmi),
            bmr: calculate_bmr(stats.weight, stats.height, stats.age, sex),
            ideal_weight: calculate_ideal_weight(stats.height, sex),
        }
    }
}

/// Metrics of the most recent measurement.
#[must_use]
pub fn health_metrics(stats: &[PersonalStats], sex: Sex) -> Option<HealthMetrics> {
    stats
        .iter()
        .max_by_key(|s| (s.date, s.created_at))
        .map(|s| HealthMetrics::new(s, sex))
}

/// Body mass index from weight in kg and height in cm, rounded to one decimal.
#[must_use]
pub fn calculate_bmi(weight: f32, height: f32) -> f32 {
    let height = height / 100.0;
    round_1(weight / (height * height))
}

#[must_use]
pub fn bmi_category(bmi: f32) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::NormalWeight
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Basal metabolic rate in kcal per day using the Mifflin-St Jeor equation.
#[must_use]
pub fn calculate_bmr(weight: f32, height: f32, age: u32, sex: Sex) -> i32 {
    #[allow(clippy::cast_precision_loss)]
    let bmr = 10.0 * weight + 6.25 * height - 5.0 * age as f32
        + match sex {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        };
    #[allow(clippy::cast_possible_truncation)]
    let bmr = bmr.round() as i32;
    bmr
}

/// Ideal body weight in kg using the Devine formula, rounded to one decimal.
#[must_use]
pub fn calculate_ideal_weight(height: f32, sex: Sex) -> f32 {
    let (base_weight, weight_per_inch) = match sex {
        Sex::Male => (50.0, 2.3),
        Sex::Female => (45.5, 2.2),
    };
    round_1(base_weight + (height - 152.4) * weight_per_inch / 2.54)
}

fn round_1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
