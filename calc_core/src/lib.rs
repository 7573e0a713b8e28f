//! # calc_core - CalcuMaster Calculation Engine
//!
//! `calc_core` is the computational heart of CalcuMaster: unit conversion,
//! arithmetic and scientific evaluation, and a suite of everyday financial,
//! health, date and programming calculators. All inputs and outputs are
//! JSON-serializable so any front end (CLI, GUI, web) can drive it.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Calculators are pure functions from input to result
//! - **JSON-First**: All inputs, results and errors implement Serialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Explicit Precision**: One rounding policy per numeric domain
//!
//! State lives in exactly two places, the [`history`] log and the
//! [`favorites`] set, both mirrored through a pluggable [`storage`] backend.
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::conversion::ConversionRequest;
//! use calc_core::expression::evaluate;
//! use calc_core::units::UnitDomain;
//!
//! let result = ConversionRequest::new(UnitDomain::Length, 1.0, "km", "m").execute()?;
//! assert_eq!(result.value, 1000.0);
//!
//! assert_eq!(evaluate("0.1 + 0.2")?, 0.3);
//! # Ok::<(), calc_core::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`units`] / [`conversion`] - Unit tables and the conversion engine
//! - [`expression`] - Arithmetic evaluator and unary functions
//! - [`scientific`] - Trigonometry, logarithms, powers and roots
//! - [`financial`] / [`currency`] - Loans, interest, sales tax, currency
//! - [`everyday`] - Percentage, discount, tip, fuel, GPA, random numbers
//! - [`health`] - BMI, BMR, heart-rate zones
//! - [`dates`] / [`timer`] - Date differences, age, stopwatch, countdown
//! - [`statistics`] - Averages and probability
//! - [`programming`] - Bitwise operations and number bases
//! - [`catalog`] - The calculator catalog
//! - [`history`] / [`favorites`] / [`storage`] - Persistent user state
//! - [`precision`] - Rounding and number formatting
//! - [`settings`] - User settings
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod conversion;
pub mod currency;
pub mod dates;
pub mod errors;
pub mod everyday;
pub mod expression;
pub mod favorites;
pub mod financial;
pub mod health;
pub mod history;
pub mod precision;
pub mod programming;
pub mod scientific;
pub mod settings;
pub mod statistics;
pub mod storage;
pub mod timer;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use catalog::CalculatorInfo;
pub use conversion::{ConversionRequest, ConversionResult};
pub use errors::{CalcError, CalcResult};
pub use favorites::FavoritesStore;
pub use history::{HistoryEntry, HistoryEntryDraft, HistoryStore};
pub use settings::Settings;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use units::UnitDomain;
