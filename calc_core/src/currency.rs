//! # Currency Converter
//!
//! Converts between a fixed set of currencies using demonstration rates
//! quoted against USD. Rates are not live.
//!
//! `value = amount / rate_from * rate_to`, rounded to 2 decimals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};
use crate::history::HistoryEntryDraft;
use crate::precision::{self, format_grouped, format_number};

/// A currency and its units per 1 USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub per_usd: f64,
}

/// Supported currencies, in display order.
pub static CURRENCIES: [Currency; 10] = [
    Currency { code: "INR", name: "Indian Rupee", per_usd: 83.54 },
    Currency { code: "USD", name: "US Dollar", per_usd: 1.0 },
    Currency { code: "EUR", name: "Euro", per_usd: 0.92 },
    Currency { code: "JPY", name: "Japanese Yen", per_usd: 157.25 },
    Currency { code: "GBP", name: "British Pound Sterling", per_usd: 0.79 },
    Currency { code: "AUD", name: "Australian Dollar", per_usd: 1.50 },
    Currency { code: "CAD", name: "Canadian Dollar", per_usd: 1.37 },
    Currency { code: "CHF", name: "Swiss Franc", per_usd: 0.89 },
    Currency { code: "CNY", name: "Chinese Yuan", per_usd: 7.25 },
    Currency { code: "BRL", name: "Brazilian Real", per_usd: 5.25 },
];

/// Look up a currency by ISO code, ignoring case.
pub fn find_currency(code: &str) -> CalcResult<&'static Currency> {
    let code = code.trim();
    CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
        .ok_or_else(|| CalcError::unknown_unit(code, "currency"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub value: f64,
}

impl CurrencyConversion {
    /// `1000 INR to USD` = `11.97 USD`
    pub fn history_entry(&self) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("{} {} to {}", format_number(self.amount), self.from, self.to),
            format!("{} {}", format_grouped(self.value, 3), self.to),
        )
    }
}

impl fmt::Display for CurrencyConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} = {} {}",
            format_number(self.amount),
            self.from,
            format_grouped(self.value, 2),
            self.to
        )
    }
}

/// Convert `amount` between two currency codes.
pub fn convert_currency(amount: f64, from: &str, to: &str) -> CalcResult<CurrencyConversion> {
    require_finite("amount", amount)?;
    let from = find_currency(from)?;
    let to = find_currency(to)?;
    let value = amount / from.per_usd * to.per_usd;

    Ok(CurrencyConversion {
        amount,
        from: from.code.to_string(),
        to: to.code.to_string(),
        value: precision::MONEY.apply(value),
    })
}

/// "1 from = rate to"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = match precision::CURRENCY_RATE {
            precision::Precision::Decimals(places) => places as usize,
            precision::Precision::Significant(_) => 4,
        };
        write!(f, "1 {} = {:.*} {}", self.from, places, self.rate, self.to)
    }
}

/// Units of `to` per one unit of `from`, unrounded.
pub fn exchange_rate(from: &str, to: &str) -> CalcResult<ExchangeRate> {
    let from = find_currency(from)?;
    let to = find_currency(to)?;
    Ok(ExchangeRate {
        from: from.code.to_string(),
        to: to.code.to_string(),
        rate: to.per_usd / from.per_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_currency() {
        let result = convert_currency(1000.0, "INR", "USD").unwrap();
        assert_eq!(result.value, 11.97);
        assert_eq!(convert_currency(100.0, "usd", "eur").unwrap().value, 92.0);
        assert_eq!(convert_currency(0.0, "GBP", "JPY").unwrap().value, 0.0);
    }

    #[test]
    fn test_same_currency_is_identity() {
        for currency in CURRENCIES.iter() {
            let result = convert_currency(123.45, currency.code, currency.code).unwrap();
            assert_eq!(result.value, 123.45, "{}", currency.code);
        }
    }

    #[test]
    fn test_unknown_currency() {
        let err = convert_currency(1.0, "XYZ", "USD").unwrap_err();
        assert_eq!(err, CalcError::unknown_unit("XYZ", "currency"));
        assert!(convert_currency(f64::NAN, "USD", "EUR").is_err());
    }

    #[test]
    fn test_exchange_rate_display() {
        assert_eq!(exchange_rate("INR", "USD").unwrap().to_string(), "1 INR = 0.0120 USD");
        assert_eq!(exchange_rate("USD", "JPY").unwrap().to_string(), "1 USD = 157.2500 JPY");
    }

    #[test]
    fn test_history_entry() {
        let entry = convert_currency(1000.0, "INR", "USD").unwrap().history_entry();
        assert_eq!(entry.expression, "1000 INR to USD");
        assert_eq!(entry.result, "11.97 USD");
    }
}
