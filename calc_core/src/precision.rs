//! # Numeric Precision Policy
//!
//! One rounding rule per numeric domain, applied only to final results:
//!
//! | Domain                                   | Policy                  |
//! |------------------------------------------|-------------------------|
//! | Unit conversion                          | 10 significant digits   |
//! | Rate info display ("1 m = 3.28084 ft")   | 6 significant digits    |
//! | Arithmetic, scientific, percent, stats   | 15 significant digits   |
//! | Trig table display                       | 10 significant digits   |
//! | Money                                    | 2 decimal places        |
//! | Currency rate display                    | 4 decimal places        |
//!
//! Significant-digit rounding stabilises floating-point noise
//! (`0.1 + 0.2` → `0.3`) without changing magnitude.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::precision::{round_significant, ARITHMETIC};
//!
//! assert_eq!(round_significant(0.1 + 0.2, 15), 0.3);
//! assert_eq!(ARITHMETIC.apply(1.0 / 3.0), 0.333333333333333);
//! ```

use serde::{Deserialize, Serialize};

/// A rounding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "digits")]
pub enum Precision {
    /// Round to N significant digits
    Significant(u32),
    /// Round to N digits after the decimal point
    Decimals(u32),
}

impl Precision {
    /// Apply this rule. Non-finite values pass through unchanged.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Precision::Significant(digits) => round_significant(value, digits),
            Precision::Decimals(places) => round_decimals(value, places),
        }
    }
}

/// Unit conversion results
pub const CONVERSION: Precision = Precision::Significant(10);
/// "1 X = Y Z" info line for unit conversions
pub const RATE_INFO: Precision = Precision::Significant(6);
/// Expression evaluation, scientific functions, percentages, statistics
pub const ARITHMETIC: Precision = Precision::Significant(15);
/// Trigonometry table display
pub const TRIG_DISPLAY: Precision = Precision::Significant(10);
/// Monetary amounts
pub const MONEY: Precision = Precision::Decimals(2);
/// Currency exchange rate display
pub const CURRENCY_RATE: Precision = Precision::Decimals(4);

/// Round to `digits` significant digits (clamped to 1..=17).
pub fn round_significant(value: f64, digits: u32) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    let digits = digits.clamp(1, 17) as usize;
    format!("{:.*e}", digits - 1, value).parse().unwrap_or(value)
}

/// Round to `places` decimal places.
pub fn round_decimals(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", places as usize, value).parse().unwrap_or(value)
}

/// Render a number the way a browser renders `String(n)`: shortest
/// round-trip digits, exponent form outside `[1e-6, 1e21)`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        return with_signed_exponent(&format!("{:e}", value));
    }
    format!("{}", value)
}

/// Render with exactly `digits` significant digits, like `toPrecision`.
///
/// ```rust
/// use calc_core::precision::to_precision_string;
///
/// assert_eq!(to_precision_string(0.70710678118654, 10), "0.7071067812");
/// assert_eq!(to_precision_string(1.5e-9, 3), "1.50e-9");
/// ```
pub fn to_precision_string(value: f64, digits: u32) -> String {
    if !value.is_finite() {
        return format_number(value);
    }
    let digits = digits.clamp(1, 100) as usize;
    if value == 0.0 {
        return format!("{:.*}", digits - 1, 0.0);
    }

    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };

    if exponent < -6 || exponent >= digits as i32 {
        return with_signed_exponent(&format!("{}e{}", mantissa, exponent));
    }

    let rounded: f64 = scientific.parse().unwrap_or(value);
    let places = (digits as i32 - 1 - exponent).max(0) as usize;
    format!("{:.*}", places, rounded)
}

/// Group the integer part with commas and show at most
/// `max_fraction_digits` decimals, trailing zeros trimmed.
///
/// ```rust
/// use calc_core::precision::format_grouped;
///
/// assert_eq!(format_grouped(1048576.0, 3), "1,048,576");
/// assert_eq!(format_grouped(-1234.5678, 2), "-1,234.57");
/// ```
pub fn format_grouped(value: f64, max_fraction_digits: u32) -> String {
    if !value.is_finite() || value.abs() >= 1e21 {
        return format_number(value);
    }
    let rounded = round_decimals(value, max_fraction_digits);
    let text = format!("{:.*}", max_fraction_digits as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (text.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// Currency amount: symbol, grouped digits, at most two decimals.
///
/// ```rust
/// use calc_core::precision::format_money;
///
/// assert_eq!(format_money("₹", 2124.7), "₹2,124.7");
/// ```
pub fn format_money(symbol: &str, value: f64) -> String {
    format!("{}{}", symbol, format_grouped(value, 2))
}

fn with_signed_exponent(text: &str) -> String {
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => text.to_string(),
    }
}
