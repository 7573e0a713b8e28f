//! # Scientific Calculators
//!
//! Trigonometry table, logarithms to any base, powers and roots.
//!
//! Logarithm, power and root results are rounded to 15 significant digits.
//! Trig values keep full precision and are rounded only for display by
//! [`format_trig_value`].
//!
//! ## Example
//!
//! ```rust
//! use calc_core::scientific::{logarithm, root, LogBase, RootKind};
//!
//! assert_eq!(logarithm(1000.0, LogBase::Common)?.value, 3.0);
//! assert_eq!(root(-27.0, RootKind::Cube)?.value, -3.0);
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};
use crate::history::HistoryEntryDraft;
use crate::precision::{self, format_grouped, format_number, to_precision_string};

/// A labelled scalar result (`log(100)` = 2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScientificResult {
    pub label: String,
    pub value: f64,
}

impl ScientificResult {
    fn new(label: String, raw: f64) -> CalcResult<Self> {
        if !raw.is_finite() {
            return Err(CalcError::evaluation(label, "result is not a finite number"));
        }
        Ok(ScientificResult {
            label,
            value: precision::ARITHMETIC.apply(raw),
        })
    }

    pub fn history_entry(&self) -> HistoryEntryDraft {
        HistoryEntryDraft::new(self.label.clone(), format_grouped(self.value, 3))
    }
}

impl fmt::Display for ScientificResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.label, format_number(self.value))
    }
}

// ============================================================================
// Trigonometry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Degrees => angle * (std::f64::consts::PI / 180.0),
            AngleUnit::Radians => angle,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            AngleUnit::Degrees => "°",
            AngleUnit::Radians => "rad",
        }
    }
}

/// All six trig functions of one angle. Undefined values are `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrigTable {
    pub angle: f64,
    pub unit: AngleUnit,
    pub sin: f64,
    pub cos: f64,
    pub tan: f64,
    pub csc: f64,
    pub sec: f64,
    pub cot: f64,
}

impl TrigTable {
    /// `(name, value)` pairs in display order
    pub fn rows(&self) -> [(&'static str, f64); 6] {
        [
            ("sin", self.sin),
            ("cos", self.cos),
            ("tan", self.tan),
            ("csc", self.csc),
            ("sec", self.sec),
            ("cot", self.cot),
        ]
    }

    /// `Trig(45°)` = `sin=0.7071067812, cos=0.7071067812`
    pub fn history_entry(&self) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("Trig({}{})", format_number(self.angle), self.unit.suffix()),
            format!(
                "sin={}, cos={}",
                format_trig_value(self.sin),
                format_trig_value(self.cos)
            ),
        )
    }
}

/// Compute sin, cos, tan and their reciprocals.
///
/// Near odd multiples of 90° (|cos| < 1e-15) tan is reported as ∞ and cot
/// as 0 instead of the huge finite values floating point produces.
pub fn trig_table(angle: f64, unit: AngleUnit) -> CalcResult<TrigTable> {
    require_finite("angle", angle)?;
    let radians = unit.to_radians(angle);

    let sin = radians.sin();
    let cos = radians.cos();
    let tan = radians.tan();
    let near_right_angle = cos.abs() < 1e-15;

    let cot = if near_right_angle {
        0.0
    } else if tan != 0.0 {
        1.0 / tan
    } else {
        f64::INFINITY
    };

    Ok(TrigTable {
        angle,
        unit,
        sin,
        cos,
        tan: if near_right_angle { f64::INFINITY } else { tan },
        csc: if sin != 0.0 { 1.0 / sin } else { f64::INFINITY },
        sec: if cos != 0.0 { 1.0 / cos } else { f64::INFINITY },
        cot,
    })
}

/// Display rule for trig values: `∞`, `0` for noise below 1e-14, else 10
/// significant digits.
pub fn format_trig_value(value: f64) -> String {
    if !value.is_finite() {
        return "∞".to_string();
    }
    if value.abs() < 1e-14 {
        return "0".to_string();
    }
    match precision::TRIG_DISPLAY {
        precision::Precision::Significant(digits) => to_precision_string(value, digits),
        rule => format_number(rule.apply(value)),
    }
}

// ============================================================================
// Logarithms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "base", rename_all = "snake_case")]
pub enum LogBase {
    /// Base 10
    Common,
    /// Base e
    Natural,
    Custom(f64),
}

impl LogBase {
    pub fn value(self) -> f64 {
        match self {
            LogBase::Common => 10.0,
            LogBase::Natural => std::f64::consts::E,
            LogBase::Custom(b) => b,
        }
    }
}

/// Logarithm of `number` in the given base.
///
/// # Errors
///
/// `DomainError` when `number <= 0`, or the base is `<= 0` or exactly 1.
pub fn logarithm(number: f64, base: LogBase) -> CalcResult<ScientificResult> {
    require_finite("number", number)?;
    let b = require_finite("base", base.value())?;

    if number <= 0.0 {
        return Err(CalcError::domain("log", format_number(number), "number must be greater than zero"));
    }
    if b <= 0.0 || b == 1.0 {
        return Err(CalcError::domain(
            "log",
            format_number(b),
            "base must be greater than zero and not equal to 1",
        ));
    }

    let n = format_number(number);
    let (label, raw) = match base {
        LogBase::Common => (format!("log({})", n), number.log10()),
        LogBase::Natural => (format!("ln({})", n), number.ln()),
        LogBase::Custom(b) => (format!("log base {} of {}", format_number(b), n), number.ln() / b.ln()),
    };
    ScientificResult::new(label, raw)
}

// ============================================================================
// Powers and roots
// ============================================================================

/// `base ^ exponent`
pub fn power(base: f64, exponent: f64) -> CalcResult<ScientificResult> {
    require_finite("base", base)?;
    require_finite("exponent", exponent)?;
    let label = format!("{} ^ {}", format_number(base), format_number(exponent));
    ScientificResult::new(label, base.powf(exponent))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "degree", rename_all = "snake_case")]
pub enum RootKind {
    Square,
    Cube,
    /// Root of arbitrary degree
    Nth(f64),
}

/// Square, cube or nth root.
///
/// An odd integer degree of a negative number yields the real (negative)
/// root.
///
/// # Errors
///
/// * `InvalidInput` - nth root of degree 0
/// * `DomainError` - even root (or non-integer degree) of a negative number
pub fn root(number: f64, kind: RootKind) -> CalcResult<ScientificResult> {
    require_finite("number", number)?;
    let n = format_number(number);

    match kind {
        RootKind::Square => {
            if number < 0.0 {
                return Err(CalcError::domain("√", n, "square root of a negative number"));
            }
            ScientificResult::new(format!("√({})", n), number.sqrt())
        }
        RootKind::Cube => ScientificResult::new(format!("∛({})", n), number.cbrt()),
        RootKind::Nth(degree) => {
            require_finite("degree", degree)?;
            if degree == 0.0 {
                return Err(CalcError::invalid_input("degree", "0", "Root degree cannot be zero"));
            }
            let label = format!("{}√({})", format_number(degree), n);
            if number >= 0.0 {
                return ScientificResult::new(label, number.powf(1.0 / degree));
            }
            if degree % 2.0 == 0.0 {
                return Err(CalcError::domain(label, n, "even root of a negative number"));
            }
            if degree.fract() != 0.0 {
                return Err(CalcError::domain(label, n, "no real root for a fractional degree"));
            }
            // Odd integer degree: real root
            ScientificResult::new(label, -(-number).powf(1.0 / degree))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trig_table_45_degrees() {
        let table = trig_table(45.0, AngleUnit::Degrees).unwrap();
        assert_eq!(format_trig_value(table.sin), "0.7071067812");
        assert_eq!(format_trig_value(table.cos), "0.7071067812");
        assert_eq!(format_trig_value(table.tan), "1.000000000");
        assert_eq!(format_trig_value(table.cot), "1.000000000");
        assert_eq!(format_trig_value(table.csc), "1.414213562");
    }

    #[test]
    fn test_trig_table_right_angle() {
        let table = trig_table(90.0, AngleUnit::Degrees).unwrap();
        assert_eq!(table.sin, 1.0);
        assert_eq!(format_trig_value(table.cos), "0");
        assert!(table.tan.is_infinite());
        assert_eq!(table.cot, 0.0);
        assert_eq!(format_trig_value(table.tan), "∞");
    }

    #[test]
    fn test_trig_table_zero() {
        let table = trig_table(0.0, AngleUnit::Radians).unwrap();
        assert_eq!(table.sin, 0.0);
        assert!(table.csc.is_infinite());
        assert!(table.cot.is_infinite());
        assert_eq!(table.sec, 1.0);
    }

    #[test]
    fn test_trig_history_entry() {
        let entry = trig_table(30.0, AngleUnit::Degrees).unwrap().history_entry();
        assert_eq!(entry.expression, "Trig(30°)");
        assert_eq!(entry.result, "sin=0.5000000000, cos=0.8660254038");
        assert!(trig_table(f64::NAN, AngleUnit::Degrees).is_err());
    }

    #[test]
    fn test_logarithms() {
        let common = logarithm(100.0, LogBase::Common).unwrap();
        assert_eq!((common.value, common.label.as_str()), (2.0, "log(100)"));

        let natural = logarithm(std::f64::consts::E, LogBase::Natural).unwrap();
        assert_eq!(natural.value, 1.0);

        let custom = logarithm(8.0, LogBase::Custom(2.0)).unwrap();
        assert_eq!((custom.value, custom.label.as_str()), (3.0, "log base 2 of 8"));
    }

    #[test]
    fn test_logarithm_domain_errors() {
        for (number, base) in [
            (0.0, LogBase::Common),
            (-5.0, LogBase::Natural),
            (8.0, LogBase::Custom(1.0)),
            (8.0, LogBase::Custom(0.0)),
            (8.0, LogBase::Custom(-2.0)),
        ] {
            assert!(matches!(logarithm(number, base), Err(CalcError::DomainError { .. })));
        }
    }

    #[test]
    fn test_power() {
        let r = power(2.0, 10.0).unwrap();
        assert_eq!((r.value, r.label.as_str()), (1024.0, "2 ^ 10"));
        assert_eq!(power(2.0, 0.5).unwrap().value, 1.4142135623731);
        assert!(matches!(power(10.0, 400.0), Err(CalcError::EvaluationError { .. })));
        assert!(power(-8.0, 1.0 / 3.0).is_err());
    }

    #[test]
    fn test_roots() {
        assert_eq!(root(81.0, RootKind::Square).unwrap().value, 9.0);
        assert_eq!(root(64.0, RootKind::Cube).unwrap().label, "∛(64)");
        assert_eq!(root(64.0, RootKind::Cube).unwrap().value, 4.0);
        assert_eq!(root(16.0, RootKind::Nth(4.0)).unwrap().value, 2.0);
        let r = root(-32.0, RootKind::Nth(5.0)).unwrap();
        assert_eq!((r.value, r.label.as_str()), (-2.0, "5√(-32)"));
    }

    #[test]
    fn test_root_errors() {
        assert!(matches!(root(-4.0, RootKind::Square), Err(CalcError::DomainError { .. })));
        assert!(matches!(root(-16.0, RootKind::Nth(4.0)), Err(CalcError::DomainError { .. })));
        assert!(matches!(root(-16.0, RootKind::Nth(2.5)), Err(CalcError::DomainError { .. })));
        assert!(matches!(root(16.0, RootKind::Nth(0.0)), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_history_uses_grouped_result() {
        let entry = power(10.0, 6.0).unwrap().history_entry();
        assert_eq!(entry.expression, "10 ^ 6");
        assert_eq!(entry.result, "1,000,000");
    }
}
