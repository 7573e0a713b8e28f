//! # Conversion Engine
//!
//! Converts an amount between two units of the same domain by routing it
//! through the domain's base unit:
//!
//! 1. resolve both units by exact symbol
//! 2. `base = from.transform_to(amount)` or `amount * from.factor`
//! 3. `result = to.transform_from(base)` or `base / to.factor`
//! 4. round the final result to 10 significant digits
//!
//! The engine is a pure function over a unit slice: no caching, no shared
//! state, safe to call from anywhere.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::conversion::convert;
//! use calc_core::units::UnitDomain;
//!
//! let temps = UnitDomain::Temperature.table().units();
//! assert_eq!(convert(100.0, "°C", "°F", temps).unwrap(), 212.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};
use crate::history::HistoryEntryDraft;
use crate::precision::{self, format_grouped, format_number};
use crate::units::{Unit, UnitDomain};

/// Convert `amount` from one unit symbol to another within `units`.
///
/// # Errors
///
/// * `InvalidInput` - `amount` is NaN or infinite
/// * `UnknownUnit` - either symbol is not in `units`
/// * `ConversionFailed` - a zero factor or a non-finite intermediate value
pub fn convert(amount: f64, from_symbol: &str, to_symbol: &str, units: &[Unit]) -> CalcResult<f64> {
    require_finite("amount", amount)?;
    let from = find_unit(units, from_symbol)?;
    let to = find_unit(units, to_symbol)?;
    convert_between(amount, from, to)
}

/// Convert between two already-resolved units.
pub fn convert_between(amount: f64, from: &Unit, to: &Unit) -> CalcResult<f64> {
    require_finite("amount", amount)?;
    let base = to_base(amount, from)?;
    let result = from_base(base, to)?;
    Ok(precision::CONVERSION.apply(result))
}

fn to_base(amount: f64, unit: &Unit) -> CalcResult<f64> {
    let base = match unit.transform_to {
        Some(transform) => transform(amount),
        None => amount * unit.factor,
    };
    if !base.is_finite() {
        return Err(CalcError::conversion_failed(format!(
            "{} {} has no finite base-unit value",
            format_number(amount),
            unit.symbol
        )));
    }
    Ok(base)
}

fn from_base(base: f64, unit: &Unit) -> CalcResult<f64> {
    let result = match unit.transform_from {
        Some(transform) => transform(base),
        None => {
            if unit.factor == 0.0 {
                return Err(CalcError::conversion_failed(format!(
                    "unit '{}' has a zero factor",
                    unit.symbol
                )));
            }
            base / unit.factor
        }
    };
    if !result.is_finite() {
        return Err(CalcError::conversion_failed(format!(
            "result in {} is not a finite number",
            unit.symbol
        )));
    }
    Ok(result)
}

fn find_unit<'a>(units: &'a [Unit], symbol: &str) -> CalcResult<&'a Unit> {
    units
        .iter()
        .find(|u| u.symbol == symbol)
        .ok_or_else(|| CalcError::unknown_unit(symbol, table_name(units)))
}

/// Best-effort domain name for error messages on bare slices
fn table_name(units: &[Unit]) -> String {
    UnitDomain::ALL
        .iter()
        .find(|d| {
            let table = d.table().units();
            !units.is_empty() && table.len() == units.len() && table.iter().zip(units).all(|(a, b)| a.symbol == b.symbol)
        })
        .map(|d| d.name().to_string())
        .unwrap_or_else(|| "unit".to_string())
}

// ============================================================================
// Request / Result
// ============================================================================

/// A single conversion request.
///
/// ## JSON Example
///
/// ```json
/// { "domain": "Length", "amount": 1.0, "from_unit": "km", "to_unit": "m" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub domain: UnitDomain,
    pub amount: f64,
    pub from_unit: String,
    pub to_unit: String,
}

impl ConversionRequest {
    pub fn new(domain: UnitDomain, amount: f64, from_unit: impl Into<String>, to_unit: impl Into<String>) -> Self {
        ConversionRequest {
            domain,
            amount,
            from_unit: from_unit.into(),
            to_unit: to_unit.into(),
        }
    }

    /// Run the request against the domain's built-in table.
    pub fn execute(&self) -> CalcResult<ConversionResult> {
        let value = convert(self.amount, &self.from_unit, &self.to_unit, self.domain.table().units())?;
        Ok(ConversionResult {
            request: self.clone(),
            value,
        })
    }

    /// The same request with the units swapped
    pub fn swapped(&self) -> Self {
        ConversionRequest {
            domain: self.domain,
            amount: self.amount,
            from_unit: self.to_unit.clone(),
            to_unit: self.from_unit.clone(),
        }
    }
}

/// Result of a conversion, carrying the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub request: ConversionRequest,
    pub value: f64,
}

impl ConversionResult {
    /// History log entry: `1 km to m` = `1,000 m`
    pub fn history_entry(&self) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!(
                "{} {} to {}",
                format_number(self.request.amount),
                self.request.from_unit,
                self.request.to_unit
            ),
            format!("{} {}", format_grouped(self.value, 3), self.request.to_unit),
        )
    }
}

impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} = {} {}",
            format_number(self.request.amount),
            self.request.from_unit,
            format_number(self.value),
            self.request.to_unit
        )
    }
}

// ============================================================================
// Rate info
// ============================================================================

/// "1 from = rate to" for a unit pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateInfo {
    pub from_unit: String,
    pub to_unit: String,
    /// Engine output for an amount of 1 (10 significant digits)
    pub rate: f64,
}

impl fmt::Display for RateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "1 {} = {} {}",
            self.from_unit,
            format_number(precision::RATE_INFO.apply(self.rate)),
            self.to_unit
        )
    }
}

/// Report how many `to` units equal one `from` unit.
///
/// Recomputed on every call; errors match [`convert`].
///
/// ```rust
/// use calc_core::conversion::rate_info;
/// use calc_core::units::UnitDomain;
///
/// let info = rate_info("m", "ft", UnitDomain::Length.table().units()).unwrap();
/// assert_eq!(info.to_string(), "1 m = 3.28084 ft");
/// ```
pub fn rate_info(from_symbol: &str, to_symbol: &str, units: &[Unit]) -> CalcResult<RateInfo> {
    let rate = convert(1.0, from_symbol, to_symbol, units)?;
    Ok(RateInfo {
        from_unit: from_symbol.to_string(),
        to_unit: to_symbol.to_string(),
        rate,
    })
}
