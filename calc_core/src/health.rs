//! # Health & Fitness Calculators
//!
//! BMI, basal metabolic rate (Mifflin-St Jeor) and target heart-rate
//! zones. Imperial inputs are converted with 1 in = 0.0254 m and
//! 1 lb = 0.453592 kg.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::history::HistoryEntryDraft;
use crate::precision::{format_grouped, format_number, round_decimals};

const KG_PER_LB: f64 = 0.453592;
const M_PER_IN: f64 = 0.0254;

// ============================================================================
// BMI
// ============================================================================

/// Body measurements in either unit system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "snake_case")]
pub enum BodyMeasurements {
    Metric { weight_kg: f64, height_cm: f64 },
    Imperial { weight_lb: f64, height_ft: f64, height_in: f64 },
}

impl BodyMeasurements {
    pub fn validate(&self) -> CalcResult<()> {
        match *self {
            BodyMeasurements::Metric { weight_kg, height_cm } => {
                require_positive("weight_kg", weight_kg)?;
                require_positive("height_cm", height_cm)?;
            }
            BodyMeasurements::Imperial {
                weight_lb,
                height_ft,
                height_in,
            } => {
                require_positive("weight_lb", weight_lb)?;
                require_non_negative("height_ft", height_ft)?;
                require_non_negative("height_in", height_in)?;
                if height_ft == 0.0 && height_in == 0.0 {
                    return Err(CalcError::invalid_input("height", "0", "Height must be greater than zero"));
                }
            }
        }
        Ok(())
    }

    pub fn weight_kg(&self) -> f64 {
        match *self {
            BodyMeasurements::Metric { weight_kg, .. } => weight_kg,
            BodyMeasurements::Imperial { weight_lb, .. } => weight_lb * KG_PER_LB,
        }
    }

    pub fn height_m(&self) -> f64 {
        match *self {
            BodyMeasurements::Metric { height_cm, .. } => height_cm / 100.0,
            BodyMeasurements::Imperial {
                height_ft, height_in, ..
            } => (height_ft * 12.0 + height_in) * M_PER_IN,
        }
    }

    fn describe(&self) -> String {
        match *self {
            BodyMeasurements::Metric { weight_kg, height_cm } => {
                format!("W {}kg, H {}cm", format_number(weight_kg), format_number(height_cm))
            }
            BodyMeasurements::Imperial {
                weight_lb,
                height_ft,
                height_in,
            } => format!(
                "W {}lbs, H {}'{}\"",
                format_number(weight_lb),
                format_number(height_ft),
                format_number(height_in)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Underweight < 18.5 ≤ Normal < 25 ≤ Overweight < 30 ≤ Obese
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    /// One decimal place
    pub bmi: f64,
    pub category: BmiCategory,
}

impl BmiResult {
    /// `BMI: W 70kg, H 175cm` = `22.9 (Normal)`
    pub fn history_entry(&self, input: &BodyMeasurements) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("BMI: {}", input.describe()),
            format!("{:.1} ({})", self.bmi, self.category),
        )
    }
}

/// `weight (kg) / height (m)²`. The category uses the unrounded value.
pub fn calculate_bmi(input: &BodyMeasurements) -> CalcResult<BmiResult> {
    input.validate()?;
    let height = input.height_m();
    let bmi = input.weight_kg() / (height * height);
    Ok(BmiResult {
        bmi: round_decimals(bmi, 1),
        category: BmiCategory::from_bmi(bmi),
    })
}

// ============================================================================
// BMR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Sex {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            _ => Err(CalcError::invalid_input("sex", s, "Expected 'male' or 'female'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    #[default]
    Light,
    Moderate,
    Active,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 6] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
            ActivityLevel::ExtraActive => 2.2,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::Light => "Light exercise/sports 1-3 days/week",
            ActivityLevel::Moderate => "Moderate exercise/sports 3-5 days/week",
            ActivityLevel::Active => "Hard exercise/sports 6-7 days a week",
            ActivityLevel::VeryActive => "Very hard exercise/sports & physical job",
            ActivityLevel::ExtraActive => "Very hard exercise/sports & physical job (2x training)",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "veryactive" => Ok(ActivityLevel::VeryActive),
            "extraactive" => Ok(ActivityLevel::ExtraActive),
            _ => Err(CalcError::invalid_input(
                "activity",
                s,
                "Expected sedentary, light, moderate, active, very-active or extra-active",
            )),
        }
    }
}

/// Input for the Mifflin-St Jeor equation. Imperial measurements are
/// weight in pounds and height in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmrInput {
    pub sex: Sex,
    pub age_years: u32,
    pub weight: f64,
    pub height: f64,
    #[serde(default)]
    pub imperial: bool,
    #[serde(default)]
    pub activity: ActivityLevel,
}

impl BmrInput {
    pub fn validate(&self) -> CalcResult<()> {
        if self.age_years == 0 {
            return Err(CalcError::invalid_input("age_years", "0", "Age must be greater than zero"));
        }
        require_positive("weight", self.weight)?;
        require_positive("height", self.height)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmrResult {
    /// Calories per day at rest
    pub bmr: f64,
    /// BMR scaled by the activity multiplier
    pub daily_calories: f64,
}

impl BmrResult {
    /// `BMR for 25y old male` = `1,674 calories/day`
    pub fn history_entry(&self, input: &BmrInput) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("BMR for {}y old {}", input.age_years, input.sex),
            format!("{} calories/day", format_grouped(self.bmr.round(), 0)),
        )
    }
}

/// `10w + 6.25h − 5a + 5` (male) or `− 161` (female), w in kg, h in cm.
pub fn calculate_bmr(input: &BmrInput) -> CalcResult<BmrResult> {
    input.validate()?;
    let (weight_kg, height_cm) = if input.imperial {
        (input.weight * KG_PER_LB, input.height * 2.54)
    } else {
        (input.weight, input.height)
    };

    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(input.age_years);
    let bmr = match input.sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    };
    if bmr <= 0.0 {
        return Err(CalcError::invalid_input(
            "weight",
            format_number(input.weight),
            "Measurements give a non-positive BMR",
        ));
    }

    Ok(BmrResult {
        bmr: round_decimals(bmr, 2),
        daily_calories: round_decimals(bmr * input.activity.multiplier(), 2),
    })
}

// ============================================================================
// Heart rate
// ============================================================================

/// Training zones as percent of maximum heart rate.
pub const HEART_RATE_ZONES: [(&str, u32, u32); 5] = [
    ("Warm-up / Recovery", 50, 60),
    ("Fat Burning", 60, 70),
    ("Aerobic / Endurance", 70, 80),
    ("Anaerobic / Performance", 80, 90),
    ("Max Effort", 90, 100),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateZone {
    pub name: String,
    pub lower_percent: u32,
    pub upper_percent: u32,
    pub lower_bpm: u32,
    pub upper_bpm: u32,
}

impl fmt::Display for HeartRateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}-{}%): {} - {} bpm",
            self.name, self.lower_percent, self.upper_percent, self.lower_bpm, self.upper_bpm
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateResult {
    pub max_heart_rate: u32,
    pub zones: Vec<HeartRateZone>,
}

impl HeartRateResult {
    pub fn history_entry(&self, age_years: u32) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("Max heart rate at age {}", age_years),
            format!("{} bpm", self.max_heart_rate),
        )
    }
}

/// Max heart rate `220 − age` and its training zones.
pub fn heart_rate_zones(age_years: u32) -> CalcResult<HeartRateResult> {
    if age_years == 0 || age_years > 120 {
        return Err(CalcError::invalid_input(
            "age_years",
            age_years.to_string(),
            "Age must be between 1 and 120",
        ));
    }
    let max = 220 - age_years;
    let bpm = |percent: u32| (f64::from(max) * (f64::from(percent) / 100.0)).round() as u32;

    let zones = HEART_RATE_ZONES
        .iter()
        .map(|&(name, lower, upper)| HeartRateZone {
            name: name.to_string(),
            lower_percent: lower,
            upper_percent: upper,
            lower_bpm: bpm(lower),
            upper_bpm: bpm(upper),
        })
        .collect();

    Ok(HeartRateResult {
        max_heart_rate: max,
        zones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_metric() {
        let input = BodyMeasurements::Metric {
            weight_kg: 70.0,
            height_cm: 175.0,
        };
        let result = calculate_bmi(&input).unwrap();
        assert_eq!(result.bmi, 22.9);
        assert_eq!(result.category, BmiCategory::Normal);
        let entry = result.history_entry(&input);
        assert_eq!(entry.expression, "BMI: W 70kg, H 175cm");
        assert_eq!(entry.result, "22.9 (Normal)");
    }

    #[test]
    fn test_bmi_imperial_converts_pounds() {
        let input = BodyMeasurements::Imperial {
            weight_lb: 155.0,
            height_ft: 5.0,
            height_in: 9.0,
        };
        let result = calculate_bmi(&input).unwrap();
        assert_eq!(result.bmi, 22.9);
        assert_eq!(result.history_entry(&input).expression, "BMI: W 155lbs, H 5'9\"");
    }

    #[test]
    fn test_bmi_categories_are_contiguous() {
        assert_eq!(BmiCategory::from_bmi(18.49), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.95), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(29.95), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_bmi_validation() {
        let zero_height = BodyMeasurements::Imperial {
            weight_lb: 150.0,
            height_ft: 0.0,
            height_in: 0.0,
        };
        assert!(calculate_bmi(&zero_height).is_err());
        let no_weight = BodyMeasurements::Metric {
            weight_kg: 0.0,
            height_cm: 170.0,
        };
        assert!(calculate_bmi(&no_weight).is_err());
    }

    #[test]
    fn test_bmr() {
        let input = BmrInput {
            sex: Sex::Male,
            age_years: 25,
            weight: 70.0,
            height: 175.0,
            imperial: false,
            activity: ActivityLevel::Light,
        };
        let result = calculate_bmr(&input).unwrap();
        assert_eq!(result.bmr, 1673.75);
        assert_eq!(result.daily_calories, 2301.41);
        assert_eq!(result.history_entry(&input).result, "1,674 calories/day");

        let female = BmrInput {
            sex: Sex::Female,
            activity: ActivityLevel::Sedentary,
            ..input
        };
        let result = calculate_bmr(&female).unwrap();
        assert_eq!(result.bmr, 1507.75);
        assert_eq!(result.daily_calories, 1809.3);
    }

    #[test]
    fn test_bmr_validation() {
        let input = BmrInput {
            sex: Sex::Male,
            age_years: 0,
            weight: 70.0,
            height: 175.0,
            imperial: false,
            activity: ActivityLevel::Light,
        };
        assert!(calculate_bmr(&input).is_err());
    }

    #[test]
    fn test_heart_rate_zones() {
        let result = heart_rate_zones(25).unwrap();
        assert_eq!(result.max_heart_rate, 195);
        let bounds: Vec<_> = result.zones.iter().map(|z| (z.lower_bpm, z.upper_bpm)).collect();
        assert_eq!(bounds, vec![(98, 117), (117, 137), (137, 156), (156, 176), (176, 195)]);
        assert_eq!(result.zones[0].to_string(), "Warm-up / Recovery (50-60%): 98 - 117 bpm");
    }

    #[test]
    fn test_heart_rate_age_bounds() {
        assert!(heart_rate_zones(0).is_err());
        assert!(heart_rate_zones(121).is_err());
        assert_eq!(heart_rate_zones(120).unwrap().max_heart_rate, 100);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("very-active".parse::<ActivityLevel>().unwrap(), ActivityLevel::VeryActive);
        assert_eq!(ActivityLevel::ExtraActive.multiplier(), 2.2);
        assert!("lazy".parse::<ActivityLevel>().is_err());
    }
}
