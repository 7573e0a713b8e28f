//! # Financial Calculators
//!
//! Loan EMI, compound interest, simple interest and sales tax. All
//! monetary outputs are rounded to 2 decimal places; intermediate values
//! are not rounded.
//!
//! Rates are entered as annual percentages (`10.0` means 10%).
//!
//! ## Example
//!
//! ```rust
//! use calc_core::financial::{calculate_loan, LoanInput, TimeUnit};
//!
//! let input = LoanInput {
//!     principal: 100_000.0,
//!     annual_rate_percent: 10.0,
//!     tenure: 5.0,
//!     tenure_unit: TimeUnit::Years,
//! };
//! let result = calculate_loan(&input)?;
//! assert_eq!(result.emi, 2124.7);
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::history::HistoryEntryDraft;
use crate::precision::{self, format_money, format_number};

/// Unit of a loan tenure or deposit period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    Years,
    Months,
}

impl TimeUnit {
    pub fn to_months(self, amount: f64) -> f64 {
        match self {
            TimeUnit::Years => amount * 12.0,
            TimeUnit::Months => amount,
        }
    }

    pub fn to_years(self, amount: f64) -> f64 {
        match self {
            TimeUnit::Years => amount,
            TimeUnit::Months => amount / 12.0,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Years => write!(f, "years"),
            TimeUnit::Months => write!(f, "months"),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "y" | "yr" | "yrs" | "year" | "years" => Ok(TimeUnit::Years),
            "m" | "mo" | "month" | "months" => Ok(TimeUnit::Months),
            _ => Err(CalcError::invalid_input("time_unit", s, "Expected 'years' or 'months'")),
        }
    }
}

fn money(value: f64) -> f64 {
    precision::MONEY.apply(value)
}

// ============================================================================
// Loan / EMI
// ============================================================================

/// Input for an equated monthly installment.
///
/// ## JSON Example
///
/// ```json
/// { "principal": 100000.0, "annual_rate_percent": 10.0, "tenure": 5.0, "tenure_unit": "years" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub tenure: f64,
    #[serde(default)]
    pub tenure_unit: TimeUnit,
}

impl LoanInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("principal", self.principal)?;
        require_non_negative("annual_rate_percent", self.annual_rate_percent)?;
        require_positive("tenure", self.tenure)?;
        Ok(())
    }

    pub fn months(&self) -> f64 {
        self.tenure_unit.to_months(self.tenure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub emi: f64,
    pub total_interest: f64,
    pub total_amount: f64,
}

impl LoanResult {
    pub fn history_entry(&self, input: &LoanInput, currency: &str) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!(
                "EMI for {}{} at {}% for {} {}",
                currency,
                format_number(input.principal),
                format_number(input.annual_rate_percent),
                format_number(input.tenure),
                input.tenure_unit
            ),
            format!("{}/month", format_money(currency, self.emi)),
        )
    }
}

/// `emi = P·r·(1+r)^n / ((1+r)^n − 1)` with monthly rate `r` and `n`
/// months. A zero rate splits the principal evenly.
pub fn calculate_loan(input: &LoanInput) -> CalcResult<LoanResult> {
    input.validate()?;
    let p = input.principal;
    let n = input.months();
    let r = input.annual_rate_percent / 1200.0;

    if r == 0.0 {
        return Ok(LoanResult {
            emi: money(p / n),
            total_interest: 0.0,
            total_amount: money(p),
        });
    }

    let growth = (1.0 + r).powf(n);
    let emi = p * r * growth / (growth - 1.0);
    let total = emi * n;
    if !total.is_finite() {
        return Err(CalcError::invalid_input(
            "tenure",
            format_number(input.tenure),
            "Loan terms produce a non-finite installment",
        ));
    }

    Ok(LoanResult {
        emi: money(emi),
        total_interest: money(total - p),
        total_amount: money(total),
    })
}

// ============================================================================
// Compound interest
// ============================================================================

/// How often interest is compounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundFrequency {
    Annually,
    SemiAnnually,
    Quarterly,
    #[default]
    Monthly,
    Daily,
}

impl CompoundFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundFrequency::Annually => 1,
            CompoundFrequency::SemiAnnually => 2,
            CompoundFrequency::Quarterly => 4,
            CompoundFrequency::Monthly => 12,
            CompoundFrequency::Daily => 365,
        }
    }
}

impl FromStr for CompoundFrequency {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "annually" | "yearly" => Ok(CompoundFrequency::Annually),
            "2" | "semi-annually" | "semiannually" => Ok(CompoundFrequency::SemiAnnually),
            "4" | "quarterly" => Ok(CompoundFrequency::Quarterly),
            "12" | "monthly" => Ok(CompoundFrequency::Monthly),
            "365" | "daily" => Ok(CompoundFrequency::Daily),
            _ => Err(CalcError::invalid_input(
                "frequency",
                s,
                "Expected annually, semi-annually, quarterly, monthly or daily",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestInput {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub time: f64,
    #[serde(default)]
    pub time_unit: TimeUnit,
    #[serde(default)]
    pub frequency: CompoundFrequency,
}

impl CompoundInterestInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("principal", self.principal)?;
        require_non_negative("annual_rate_percent", self.annual_rate_percent)?;
        require_positive("time", self.time)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestResult {
    pub interest: f64,
    pub total_amount: f64,
}

/// `A = P(1 + r/n)^(n·t)`
pub fn calculate_compound_interest(input: &CompoundInterestInput) -> CalcResult<InterestResult> {
    input.validate()?;
    let p = input.principal;
    let r = input.annual_rate_percent / 100.0;
    let n = f64::from(input.frequency.periods_per_year());
    let t = input.time_unit.to_years(input.time);

    let amount = p * (1.0 + r / n).powf(n * t);
    if !amount.is_finite() {
        return Err(CalcError::invalid_input(
            "time",
            format_number(input.time),
            "Compounded amount is not a finite number",
        ));
    }

    Ok(InterestResult {
        interest: money(amount - p),
        total_amount: money(amount),
    })
}

impl InterestResult {
    pub fn compound_history_entry(&self, input: &CompoundInterestInput, currency: &str) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!(
                "Compound Interest for {}{} at {}%",
                currency,
                format_number(input.principal),
                format_number(input.annual_rate_percent)
            ),
            format!("Total: {}", format_money(currency, self.total_amount)),
        )
    }

    pub fn simple_history_entry(&self, input: &SimpleInterestInput, currency: &str) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!(
                "Interest for {}{} at {}% for {} {}",
                currency,
                format_number(input.principal),
                format_number(input.annual_rate_percent),
                format_number(input.time),
                input.time_unit
            ),
            format_money(currency, self.interest),
        )
    }
}

// ============================================================================
// Simple interest
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleInterestInput {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub time: f64,
    #[serde(default)]
    pub time_unit: TimeUnit,
}

impl SimpleInterestInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("principal", self.principal)?;
        require_non_negative("annual_rate_percent", self.annual_rate_percent)?;
        require_positive("time", self.time)?;
        Ok(())
    }
}

/// `I = P·r·t`
pub fn calculate_simple_interest(input: &SimpleInterestInput) -> CalcResult<InterestResult> {
    input.validate()?;
    let interest = input.principal * (input.annual_rate_percent / 100.0) * input.time_unit.to_years(input.time);
    Ok(InterestResult {
        interest: money(interest),
        total_amount: money(input.principal + interest),
    })
}

// ============================================================================
// Sales tax
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Amount is pre-tax; add tax on top
    #[default]
    Add,
    /// Amount already includes tax; pull it out
    Extract,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTaxInput {
    pub amount: f64,
    pub rate_percent: f64,
    #[serde(default)]
    pub mode: TaxMode,
}

impl SalesTaxInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("amount", self.amount)?;
        require_non_negative("rate_percent", self.rate_percent)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTaxResult {
    pub tax_amount: f64,
    pub final_amount: f64,
    pub original_amount: f64,
}

impl SalesTaxResult {
    pub fn history_entry(&self, input: &SalesTaxInput, currency: &str) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!(
                "{}% tax on {}{}",
                format_number(input.rate_percent),
                currency,
                format_number(input.amount)
            ),
            format!("Final Price: {}", format_money(currency, self.final_amount)),
        )
    }
}

pub fn calculate_sales_tax(input: &SalesTaxInput) -> CalcResult<SalesTaxResult> {
    input.validate()?;
    let rate = input.rate_percent / 100.0;
    let result = match input.mode {
        TaxMode::Add => {
            let tax = input.amount * rate;
            SalesTaxResult {
                tax_amount: money(tax),
                final_amount: money(input.amount + tax),
                original_amount: money(input.amount),
            }
        }
        TaxMode::Extract => {
            let original = input.amount / (1.0 + rate);
            SalesTaxResult {
                tax_amount: money(input.amount - original),
                final_amount: money(input.amount),
                original_amount: money(original),
            }
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(principal: f64, rate: f64, tenure: f64, unit: TimeUnit) -> LoanInput {
        LoanInput {
            principal,
            annual_rate_percent: rate,
            tenure,
            tenure_unit: unit,
        }
    }

    #[test]
    fn test_loan_emi() {
        let result = calculate_loan(&loan(100_000.0, 10.0, 5.0, TimeUnit::Years)).unwrap();
        assert_eq!(result.emi, 2124.7);
        assert_eq!(result.total_amount, 127482.27);
        assert_eq!(result.total_interest, 27482.27);

        let months = calculate_loan(&loan(100_000.0, 10.0, 60.0, TimeUnit::Months)).unwrap();
        assert_eq!(months, result);
    }

    #[test]
    fn test_loan_zero_rate() {
        let result = calculate_loan(&loan(1200.0, 0.0, 1.0, TimeUnit::Years)).unwrap();
        assert_eq!(result.emi, 100.0);
        assert_eq!(result.total_interest, 0.0);
        assert_eq!(result.total_amount, 1200.0);
    }

    #[test]
    fn test_loan_validation() {
        assert!(calculate_loan(&loan(0.0, 10.0, 5.0, TimeUnit::Years)).is_err());
        assert!(calculate_loan(&loan(1000.0, -1.0, 5.0, TimeUnit::Years)).is_err());
        assert!(calculate_loan(&loan(1000.0, 10.0, 0.0, TimeUnit::Years)).is_err());
        assert!(calculate_loan(&loan(f64::NAN, 10.0, 5.0, TimeUnit::Years)).is_err());
    }

    #[test]
    fn test_loan_history_entry() {
        let input = loan(100_000.0, 10.0, 5.0, TimeUnit::Years);
        let entry = calculate_loan(&input).unwrap().history_entry(&input, "₹");
        assert_eq!(entry.expression, "EMI for ₹100000 at 10% for 5 years");
        assert_eq!(entry.result, "₹2,124.7/month");
    }

    #[test]
    fn test_compound_interest() {
        let input = CompoundInterestInput {
            principal: 10_000.0,
            annual_rate_percent: 5.0,
            time: 10.0,
            time_unit: TimeUnit::Years,
            frequency: CompoundFrequency::Monthly,
        };
        let result = calculate_compound_interest(&input).unwrap();
        assert_eq!(result.total_amount, 16470.09);
        assert_eq!(result.interest, 6470.09);

        let quarterly = CompoundInterestInput {
            time: 18.0,
            time_unit: TimeUnit::Months,
            frequency: CompoundFrequency::Quarterly,
            ..input
        };
        assert_eq!(calculate_compound_interest(&quarterly).unwrap().total_amount, 10773.83);
    }

    #[test]
    fn test_compound_interest_zero_rate() {
        let input = CompoundInterestInput {
            principal: 500.0,
            annual_rate_percent: 0.0,
            time: 3.0,
            time_unit: TimeUnit::Years,
            frequency: CompoundFrequency::Daily,
        };
        let result = calculate_compound_interest(&input).unwrap();
        assert_eq!((result.total_amount, result.interest), (500.0, 0.0));
    }

    #[test]
    fn test_simple_interest() {
        let input = SimpleInterestInput {
            principal: 10_000.0,
            annual_rate_percent: 5.0,
            time: 2.0,
            time_unit: TimeUnit::Years,
        };
        let result = calculate_simple_interest(&input).unwrap();
        assert_eq!(result.interest, 1000.0);
        assert_eq!(result.total_amount, 11000.0);
        assert_eq!(result.simple_history_entry(&input, "$").result, "$1,000");

        let months = SimpleInterestInput {
            time: 6.0,
            time_unit: TimeUnit::Months,
            ..input
        };
        assert_eq!(calculate_simple_interest(&months).unwrap().interest, 250.0);
    }

    #[test]
    fn test_sales_tax_add_and_extract() {
        let add = calculate_sales_tax(&SalesTaxInput {
            amount: 100.0,
            rate_percent: 8.0,
            mode: TaxMode::Add,
        })
        .unwrap();
        assert_eq!((add.tax_amount, add.final_amount, add.original_amount), (8.0, 108.0, 100.0));

        let extract = calculate_sales_tax(&SalesTaxInput {
            amount: 100.0,
            rate_percent: 8.0,
            mode: TaxMode::Extract,
        })
        .unwrap();
        assert_eq!((extract.tax_amount, extract.final_amount, extract.original_amount), (7.41, 100.0, 92.59));
    }

    #[test]
    fn test_sales_tax_validation() {
        let input = SalesTaxInput {
            amount: -1.0,
            rate_percent: 8.0,
            mode: TaxMode::Add,
        };
        assert!(matches!(calculate_sales_tax(&input), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("Months".parse::<TimeUnit>().unwrap(), TimeUnit::Months);
        assert_eq!("quarterly".parse::<CompoundFrequency>().unwrap(), CompoundFrequency::Quarterly);
        assert_eq!("365".parse::<CompoundFrequency>().unwrap().periods_per_year(), 365);
        assert!("weekly".parse::<CompoundFrequency>().is_err());
    }
}
