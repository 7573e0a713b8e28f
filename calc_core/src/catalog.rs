//! # Calculator Catalog
//!
//! The fixed list of calculators grouped by category. Paths are the stable
//! identifiers used by favorites; names and descriptions are for display
//! and search.

use serde::Serialize;

use crate::errors::{CalcError, CalcResult};

/// One calculator entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CalculatorInfo {
    pub name: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// A named group of calculators.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CalculatorCategory {
    pub name: &'static str,
    pub calculators: &'static [CalculatorInfo],
}

const fn calc(name: &'static str, path: &'static str, description: &'static str) -> CalculatorInfo {
    CalculatorInfo {
        name,
        path,
        description,
    }
}

static CATEGORIES: &[CalculatorCategory] = &[
    CalculatorCategory {
        name: "Basic",
        calculators: &[
            calc("Scientific Calculator", "/calculators/basic", "Perform basic and advanced scientific calculations."),
            calc("Percentage", "/calculators/basic/percentage", "Calculate percentages, tips, and discounts."),
            calc(
                "Simple Interest",
                "/calculators/basic/simple-interest",
                "Calculate simple interest on a principal amount.",
            ),
        ],
    },
    CalculatorCategory {
        name: "Scientific",
        calculators: &[
            calc("Trigonometry", "/calculators/scientific/trigonometry", "Sine, cosine, tangent, and more."),
            calc("Logarithmic", "/calculators/scientific/logarithmic", "Calculate logarithms to various bases."),
            calc("Exponents & Powers", "/calculators/scientific/exponents", "Calculate powers and roots."),
        ],
    },
    CalculatorCategory {
        name: "Financial",
        calculators: &[
            calc("Loan/EMI", "/calculators/financial/loan", "Calculate Equated Monthly Installments."),
            calc("Compound Interest", "/calculators/financial/compound-interest", "Calculate compound interest."),
            calc("Sales Tax", "/calculators/financial/sales-tax", "Calculate sales tax and final price."),
            calc("Currency Converter", "/calculators/financial/currency", "Convert between different currencies."),
        ],
    },
    CalculatorCategory {
        name: "Date & Time",
        calculators: &[
            calc("Age Calculator", "/calculators/date-time/age", "Calculate age from date of birth."),
            calc("Date Difference", "/calculators/date-time/difference", "Find the duration between two dates."),
            calc("Timer & Stopwatch", "/calculators/date-time/timer", "Measure time intervals."),
        ],
    },
    CalculatorCategory {
        name: "Unit Converters",
        calculators: &[
            calc("Length", "/calculators/converters/length", "Convert units of length."),
            calc("Weight", "/calculators/converters/weight", "Convert units of weight."),
            calc("Temperature", "/calculators/converters/temperature", "Convert units of temperature."),
            calc("Speed", "/calculators/converters/speed", "Convert units of speed."),
            calc("Volume", "/calculators/converters/volume", "Convert units of volume."),
            calc("Area", "/calculators/converters/area", "Convert units of area."),
            calc("Data Size", "/calculators/converters/data", "Convert units of digital information."),
        ],
    },
    CalculatorCategory {
        name: "Programming",
        calculators: &[
            calc("Number Base", "/calculators/programming/base-converter", "Convert numbers between bases."),
            calc("Bitwise Operations", "/calculators/programming/bitwise", "Perform bitwise operations."),
        ],
    },
    CalculatorCategory {
        name: "Health & Fitness",
        calculators: &[
            calc("BMI Calculator", "/calculators/health/bmi", "Calculate Body Mass Index."),
            calc("BMR Calculator", "/calculators/health/bmr", "Calculate Basal Metabolic Rate."),
            calc("Heart Rate", "/calculators/health/heart-rate", "Calculate target heart rate zones."),
        ],
    },
    CalculatorCategory {
        name: "Statistical",
        calculators: &[
            calc("Averages", "/calculators/statistical/averages", "Calculate mean, median, and mode."),
            calc("Probability", "/calculators/statistical/probability", "Calculate probabilities."),
        ],
    },
    CalculatorCategory {
        name: "Miscellaneous",
        calculators: &[
            calc("Discount", "/calculators/misc/discount", "Calculate discounts and final prices."),
            calc("Tip Calculator", "/calculators/misc/tip", "Calculate tips for services."),
            calc("Fuel Efficiency", "/calculators/misc/fuel", "Calculate fuel efficiency."),
            calc("GPA Calculator", "/calculators/misc/gpa", "Calculate Grade Point Average."),
            calc("Random Number", "/calculators/misc/random", "Generate random numbers."),
        ],
    },
];

/// All categories in display order.
pub fn categories() -> &'static [CalculatorCategory] {
    CATEGORIES
}

/// Every calculator, flattened in display order.
pub fn all_calculators() -> impl Iterator<Item = &'static CalculatorInfo> {
    CATEGORIES.iter().flat_map(|c| c.calculators.iter())
}

/// Find a calculator by its exact path.
pub fn find(path: &str) -> Option<&'static CalculatorInfo> {
    all_calculators().find(|c| c.path == path)
}

/// Like [`find`], but an unknown path is an `UnknownCalculator` error.
pub fn lookup(path: &str) -> CalcResult<&'static CalculatorInfo> {
    find(path).ok_or_else(|| CalcError::UnknownCalculator {
        path: path.to_string(),
    })
}

/// Resolve a user-typed reference: an exact path, a case-insensitive
/// name, or the last path segment (`bmi`, `compound-interest`).
pub fn resolve(query: &str) -> CalcResult<&'static CalculatorInfo> {
    let query = query.trim();
    if let Some(info) = find(query) {
        return Ok(info);
    }
    all_calculators()
        .find(|c| c.name.eq_ignore_ascii_case(query) || c.path.rsplit('/').next() == Some(query))
        .ok_or_else(|| CalcError::UnknownCalculator {
            path: query.to_string(),
        })
}

/// Case-insensitive substring search over names and descriptions.
/// An empty query matches nothing.
pub fn search(query: &str) -> Vec<&'static CalculatorInfo> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    all_calculators()
        .filter(|c| c.name.to_lowercase().contains(&query) || c.description.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_paths_are_unique() {
        let paths: HashSet<_> = all_calculators().map(|c| c.path).collect();
        assert_eq!(paths.len(), all_calculators().count());
        assert_eq!(categories().len(), 9);
    }

    #[test]
    fn test_find_and_lookup() {
        assert_eq!(find("/calculators/health/bmi").map(|c| c.name), Some("BMI Calculator"));
        assert!(find("/calculators/nope").is_none());
        assert!(matches!(lookup("/calculators/nope"), Err(CalcError::UnknownCalculator { .. })));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve("bmi").unwrap().path, "/calculators/health/bmi");
        assert_eq!(resolve("tip calculator").unwrap().path, "/calculators/misc/tip");
        assert_eq!(resolve("/calculators/basic").unwrap().name, "Scientific Calculator");
        assert!(resolve("warp-drive").is_err());
    }

    #[test]
    fn test_search() {
        let names: Vec<_> = search("interest").iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Simple Interest", "Compound Interest"]);
        assert!(search("   ").is_empty());
        assert_eq!(search("DATA").len(), 1);
    }
}
