//! # Everyday Calculators
//!
//! Percentage, discount, tip splitting, fuel efficiency, GPA and random
//! numbers.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::everyday::{percentage_of, split_tip, TipInput};
//!
//! assert_eq!(percentage_of(20.0, 150.0)?.value, 30.0);
//!
//! let tip = split_tip(&TipInput { bill: 100.0, tip_percent: 15.0, people: 2 })?;
//! assert_eq!(tip.total_per_person, 57.5);
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use serde::{Deserialize, Serialize};

use rand::Rng;

use crate::errors::{require_finite, require_non_negative, require_positive, CalcError, CalcResult};
use crate::history::HistoryEntryDraft;
use crate::precision::{self, format_grouped, format_money, format_number};

fn money(value: f64) -> f64 {
    precision::MONEY.apply(value)
}

// ============================================================================
// Percentage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageResult {
    pub percent: f64,
    pub base: f64,
    pub value: f64,
}

impl PercentageResult {
    /// `20% of 150` = `30`
    pub fn history_entry(&self) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("{}% of {}", format_number(self.percent), format_number(self.base)),
            format_grouped(self.value, 3),
        )
    }
}

/// `percent% of base`, 15 significant digits.
pub fn percentage_of(percent: f64, base: f64) -> CalcResult<PercentageResult> {
    require_finite("percent", percent)?;
    require_finite("base", base)?;
    Ok(PercentageResult {
        percent,
        base,
        value: precision::ARITHMETIC.apply(percent / 100.0 * base),
    })
}

// ============================================================================
// Discount
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountResult {
    pub original_price: f64,
    pub discount_percent: f64,
    pub amount_saved: f64,
    pub final_price: f64,
}

impl DiscountResult {
    pub fn history_entry(&self, currency: &str) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!(
                "{}% off {}{}",
                format_number(self.discount_percent),
                currency,
                format_number(self.original_price)
            ),
            format!("Final Price: {}", format_money(currency, self.final_price)),
        )
    }
}

/// Price after a percentage discount. A discount above 100% yields a
/// negative final price, as entered.
pub fn apply_discount(original_price: f64, discount_percent: f64) -> CalcResult<DiscountResult> {
    require_non_negative("original_price", original_price)?;
    require_non_negative("discount_percent", discount_percent)?;
    let saved = discount_percent / 100.0 * original_price;
    Ok(DiscountResult {
        original_price,
        discount_percent,
        amount_saved: money(saved),
        final_price: money(original_price - saved),
    })
}

// ============================================================================
// Tip
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipInput {
    pub bill: f64,
    pub tip_percent: f64,
    /// People splitting the bill, at least 1
    pub people: u32,
}

impl TipInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("bill", self.bill)?;
        require_non_negative("tip_percent", self.tip_percent)?;
        if self.people < 1 {
            return Err(CalcError::invalid_input(
                "people",
                self.people.to_string(),
                "At least one person must split the bill",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipResult {
    pub tip_amount: f64,
    pub total_amount: f64,
    pub tip_per_person: f64,
    pub total_per_person: f64,
}

impl TipResult {
    pub fn history_entry(&self, input: &TipInput, currency: &str) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!(
                "{}% tip on {}{}",
                format_number(input.tip_percent),
                currency,
                format_number(input.bill)
            ),
            format!("Total: {}", format_money(currency, self.total_amount)),
        )
    }
}

pub fn split_tip(input: &TipInput) -> CalcResult<TipResult> {
    input.validate()?;
    let tip = input.bill * input.tip_percent / 100.0;
    let total = input.bill + tip;
    let people = f64::from(input.people);
    Ok(TipResult {
        tip_amount: money(tip),
        total_amount: money(total),
        tip_per_person: money(tip / people),
        total_per_person: money(total / people),
    })
}

// ============================================================================
// Fuel efficiency
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelInput {
    pub distance_km: f64,
    pub fuel_litres: f64,
    /// Price per litre; cost per km is reported only when positive
    #[serde(default)]
    pub price_per_litre: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelResult {
    pub km_per_litre: f64,
    pub cost_per_km: Option<f64>,
}

impl FuelResult {
    pub fn history_entry(&self, input: &FuelInput) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!(
                "Fuel efficiency for {}km, {}L",
                format_number(input.distance_km),
                format_number(input.fuel_litres)
            ),
            format!("{} km/L", format_number(self.km_per_litre)),
        )
    }
}

pub fn fuel_efficiency(input: &FuelInput) -> CalcResult<FuelResult> {
    let distance = require_positive("distance_km", input.distance_km)?;
    let fuel = require_positive("fuel_litres", input.fuel_litres)?;

    let cost_per_km = match input.price_per_litre {
        Some(price) => {
            let price = require_finite("price_per_litre", price)?;
            (price > 0.0).then(|| money(price * fuel / distance))
        }
        None => None,
    };

    Ok(FuelResult {
        km_per_litre: money(distance / fuel),
        cost_per_km,
    })
}

// ============================================================================
// GPA
// ============================================================================

/// Points on the 4.0 scale for a letter grade, ignoring case.
pub fn grade_points(grade: &str) -> Option<f64> {
    let points = match grade.trim().to_uppercase().as_str() {
        "A+" | "A" => 4.0,
        "A-" => 3.7,
        "B+" => 3.3,
        "B" => 3.0,
        "B-" => 2.7,
        "C+" => 2.3,
        "C" => 2.0,
        "C-" => 1.7,
        "D+" => 1.3,
        "D" => 1.0,
        "F" => 0.0,
        _ => return None,
    };
    Some(points)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub name: String,
    pub grade: String,
    pub credits: f64,
}

impl Course {
    pub fn new(name: impl Into<String>, grade: impl Into<String>, credits: f64) -> Self {
        Course {
            name: name.into(),
            grade: grade.into(),
            credits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaResult {
    pub gpa: f64,
    pub total_credits: f64,
    /// Courses that contributed (valid grade, positive credits)
    pub counted_courses: usize,
}

impl GpaResult {
    pub fn history_entry(&self) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("GPA ({} courses)", self.counted_courses),
            format!("{:.2}", self.gpa),
        )
    }
}

/// Credit-weighted GPA. Courses with an unknown grade or non-positive
/// credits are skipped.
pub fn calculate_gpa(courses: &[Course]) -> CalcResult<GpaResult> {
    let mut total_points = 0.0;
    let mut total_credits = 0.0;
    let mut counted = 0;

    for course in courses {
        let Some(points) = grade_points(&course.grade) else {
            continue;
        };
        if !course.credits.is_finite() || course.credits <= 0.0 {
            continue;
        }
        total_points += points * course.credits;
        total_credits += course.credits;
        counted += 1;
    }

    if total_credits == 0.0 {
        return Err(CalcError::invalid_input(
            "courses",
            courses.len().to_string(),
            "No course has a valid grade and positive credits",
        ));
    }

    Ok(GpaResult {
        gpa: precision::round_decimals(total_points / total_credits, 2),
        total_credits,
        counted_courses: counted,
    })
}

// ============================================================================
// Random number
// ============================================================================

/// Uniform integer in `[min, max]`.
///
/// ```rust
/// use calc_core::everyday::random_integer;
///
/// let n = random_integer(1, 6, &mut rand::rng())?;
/// assert!((1..=6).contains(&n));
/// # Ok::<(), calc_core::errors::CalcError>(())
/// ```
pub fn random_integer<R: Rng>(min: i64, max: i64, rng: &mut R) -> CalcResult<i64> {
    if min > max {
        return Err(CalcError::invalid_input(
            "min",
            min.to_string(),
            format!("Minimum must not exceed maximum ({})", max),
        ));
    }
    Ok(rng.random_range(min..=max))
}

/// `Random (1-100)` = `42`
pub fn random_history_entry(min: i64, max: i64, value: i64) -> HistoryEntryDraft {
    HistoryEntryDraft::new(format!("Random ({}-{})", min, max), value.to_string())
}
