//! # Statistics
//!
//! Averages over a free-form list of numbers, and simple event probability.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::history::HistoryEntryDraft;
use crate::precision::{self, format_grouped, format_number};

/// Split on commas and whitespace, keeping tokens that parse as finite
/// numbers.
pub fn parse_numbers(input: &str) -> Vec<f64> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragesResult {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Every value sharing the highest frequency, ascending. Empty when no
    /// value repeats.
    pub mode: Vec<f64>,
}

impl AveragesResult {
    /// `Avg of 10, 20, 20...` = `Mean: 24`
    pub fn history_entry(&self, numbers: &[f64]) -> HistoryEntryDraft {
        let head: Vec<String> = numbers.iter().take(3).map(|n| format_number(*n)).collect();
        HistoryEntryDraft::new(
            format!("Avg of {}...", head.join(", ")),
            format!("Mean: {}", format_grouped(self.mean, 3)),
        )
    }
}

pub fn averages(numbers: &[f64]) -> CalcResult<AveragesResult> {
    if numbers.is_empty() {
        return Err(CalcError::invalid_input("numbers", "", "Enter at least one number"));
    }

    let count = numbers.len();
    let sum: f64 = numbers.iter().sum();
    if !sum.is_finite() {
        return Err(CalcError::invalid_input("numbers", format_number(sum), "Sum is too large to average"));
    }
    let mean = sum / count as f64;

    let mut sorted = numbers.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = count / 2;
    let median = if count % 2 == 0 {
        sorted[mid - 1] / 2.0 + sorted[mid] / 2.0
    } else {
        sorted[mid]
    };

    // run lengths over the sorted values
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for &n in &sorted {
        match runs.last_mut() {
            Some((value, len)) if *value == n => *len += 1,
            _ => runs.push((n, 1)),
        }
    }
    let max_freq = runs.iter().map(|&(_, len)| len).max().unwrap_or(0);
    let mode = if max_freq > 1 {
        runs.iter()
            .filter(|&&(_, len)| len == max_freq)
            .map(|&(value, _)| value)
            .collect()
    } else {
        Vec::new()
    };

    Ok(AveragesResult {
        count,
        sum: precision::ARITHMETIC.apply(sum),
        mean: precision::ARITHMETIC.apply(mean),
        median: precision::ARITHMETIC.apply(median),
        mode,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityResult {
    pub favorable: u64,
    pub total: u64,
    pub probability: f64,
    pub percentage: f64,
    /// `favorable:unfavorable`, reduced
    pub odds_for: String,
    /// `unfavorable:favorable`, reduced
    pub odds_against: String,
}

impl ProbabilityResult {
    /// `P(1/6)` = `0.1667`
    pub fn history_entry(&self) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("P({}/{})", self.favorable, self.total),
            format!("{:.4}", self.probability),
        )
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

pub fn probability(favorable: u64, total: u64) -> CalcResult<ProbabilityResult> {
    if total == 0 {
        return Err(CalcError::invalid_input("total", "0", "Total outcomes must be greater than zero"));
    }
    if favorable > total {
        return Err(CalcError::invalid_input(
            "favorable",
            favorable.to_string(),
            "Favorable outcomes cannot exceed total outcomes",
        ));
    }

    let unfavorable = total - favorable;
    let divisor = gcd(favorable, unfavorable);
    let probability = favorable as f64 / total as f64;

    Ok(ProbabilityResult {
        favorable,
        total,
        probability,
        percentage: probability * 100.0,
        odds_for: format!("{}:{}", favorable / divisor, unfavorable / divisor),
        odds_against: format!("{}:{}", unfavorable / divisor, favorable / divisor),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_numbers("10, 20,20  30\n40"), vec![10.0, 20.0, 20.0, 30.0, 40.0]);
        assert_eq!(parse_numbers("1, abc, 2.5, , -3"), vec![1.0, 2.5, -3.0]);
        assert!(parse_numbers("  ,, ").is_empty());
        assert!(parse_numbers("inf nan").is_empty());
    }

    #[test]
    fn test_averages() {
        let numbers = parse_numbers("10, 20, 20, 30, 40");
        let result = averages(&numbers).unwrap();
        assert_eq!(result.count, 5);
        assert_eq!(result.sum, 120.0);
        assert_eq!(result.mean, 24.0);
        assert_eq!(result.median, 20.0);
        assert_eq!(result.mode, vec![20.0]);

        let entry = result.history_entry(&numbers);
        assert_eq!(entry.expression, "Avg of 10, 20, 20...");
        assert_eq!(entry.result, "Mean: 24");
    }

    #[test]
    fn test_even_count_median() {
        let result = averages(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(result.median, 2.5);
        assert!(result.mode.is_empty());
    }

    #[test]
    fn test_multimodal_ascending() {
        let result = averages(&[5.0, 1.0, 5.0, 1.0, 3.0]).unwrap();
        assert_eq!(result.mode, vec![1.0, 5.0]);
    }

    #[test]
    fn test_mean_precision() {
        let result = averages(&[0.1, 0.2]).unwrap();
        assert_eq!(result.sum, 0.3);
        assert_eq!(result.mean, 0.15);
    }

    #[test]
    fn test_averages_empty() {
        assert!(matches!(averages(&[]), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_averages_sum_overflow() {
        assert!(matches!(averages(&[1e308, 1e308]), Err(CalcError::InvalidInput { .. })));

        let result = averages(&[1e308, -1e308, 1e308, -1e308, 1e308]).unwrap();
        assert!(result.mean.is_finite());
        assert_eq!(result.median, 1e308);
    }

    #[test]
    fn test_probability() {
        let result = probability(1, 6).unwrap();
        assert!((result.probability - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(result.odds_for, "1:5");
        assert_eq!(result.odds_against, "5:1");
        assert_eq!(result.history_entry().result, "0.1667");
        assert_eq!(result.history_entry().expression, "P(1/6)");

        let result = probability(4, 6).unwrap();
        assert_eq!(result.odds_for, "2:1");
    }

    #[test]
    fn test_probability_edges() {
        assert_eq!(probability(0, 4).unwrap().odds_for, "0:1");
        assert_eq!(probability(4, 4).unwrap().odds_against, "0:1");
        assert!(probability(1, 0).is_err());
        assert!(probability(7, 6).is_err());
    }
}
