//! # Unit Tables
//!
//! Immutable, per-domain unit tables used by the conversion engine.
//!
//! Every domain routes conversions through a single base unit (meter, gram,
//! Celsius, m/s, liter, square meter, byte). A [`Unit`] either scales
//! linearly against that base via `factor`, or supplies a pair of transform
//! functions for affine relationships such as Fahrenheit.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::UnitDomain;
//!
//! let table = UnitDomain::Length.table();
//! let mile = table.get("mi").unwrap();
//! assert_eq!(mile.factor, 1609.34);
//! assert!(table.get("°C").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Signature of a unit transform (quantity in one unit -> quantity in another)
pub type Transform = fn(f64) -> f64;

/// A unit descriptor.
///
/// For linear units `base = value * factor`. Units with `transform_to` and
/// `transform_from` bypass `factor` entirely.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Unit {
    /// Display name (e.g., "Kilometer")
    pub name: &'static str,
    /// Lookup key, unique within a table (e.g., "km")
    pub symbol: &'static str,
    /// Base units per one of this unit
    pub factor: f64,
    /// Converts a quantity in this unit into the domain's base unit
    #[serde(skip)]
    pub transform_to: Option<Transform>,
    /// Converts a base-unit quantity into this unit
    #[serde(skip)]
    pub transform_from: Option<Transform>,
}

impl Unit {
    /// Create a purely multiplicative unit.
    pub const fn linear(name: &'static str, symbol: &'static str, factor: f64) -> Self {
        Unit {
            name,
            symbol,
            factor,
            transform_to: None,
            transform_from: None,
        }
    }

    /// Create a unit related to the base by a pair of transforms.
    pub const fn affine(name: &'static str, symbol: &'static str, to_base: Transform, from_base: Transform) -> Self {
        Unit {
            name,
            symbol,
            factor: 1.0,
            transform_to: Some(to_base),
            transform_from: Some(from_base),
        }
    }

    /// True when conversion uses `factor` rather than transforms
    pub fn is_linear(&self) -> bool {
        self.transform_to.is_none() && self.transform_from.is_none()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

// ============================================================================
// Domains
// ============================================================================

/// Physical (or digital) quantity a unit table measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitDomain {
    Length,
    Weight,
    Temperature,
    Speed,
    Volume,
    Area,
    DataSize,
}

impl UnitDomain {
    /// All domains in catalog order
    pub const ALL: [UnitDomain; 7] = [
        UnitDomain::Length,
        UnitDomain::Weight,
        UnitDomain::Temperature,
        UnitDomain::Speed,
        UnitDomain::Volume,
        UnitDomain::Area,
        UnitDomain::DataSize,
    ];

    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            UnitDomain::Length => "Length",
            UnitDomain::Weight => "Weight",
            UnitDomain::Temperature => "Temperature",
            UnitDomain::Speed => "Speed",
            UnitDomain::Volume => "Volume",
            UnitDomain::Area => "Area",
            UnitDomain::DataSize => "Data Size",
        }
    }

    /// One-line description for converter headers
    pub fn description(&self) -> &'static str {
        match self {
            UnitDomain::Length => "Convert units of length.",
            UnitDomain::Weight => "Convert units of mass and weight.",
            UnitDomain::Temperature => "Convert between Celsius, Fahrenheit, and Kelvin.",
            UnitDomain::Speed => "Convert units of speed.",
            UnitDomain::Volume => "Convert units of volume.",
            UnitDomain::Area => "Convert units of area.",
            UnitDomain::DataSize => "Convert units of digital information.",
        }
    }

    /// Symbol of the reference unit all conversions route through
    pub fn base_symbol(&self) -> &'static str {
        match self {
            UnitDomain::Length => "m",
            UnitDomain::Weight => "g",
            UnitDomain::Temperature => "°C",
            UnitDomain::Speed => "m/s",
            UnitDomain::Volume => "L",
            UnitDomain::Area => "m²",
            UnitDomain::DataSize => "B",
        }
    }

    /// Initial (from, to) selection shown by a converter
    pub fn default_pair(&self) -> (&'static str, &'static str) {
        match self {
            UnitDomain::Length => ("m", "ft"),
            UnitDomain::Weight => ("kg", "lb"),
            UnitDomain::Temperature => ("°C", "°F"),
            UnitDomain::Speed => ("km/h", "mph"),
            UnitDomain::Volume => ("L", "gal"),
            UnitDomain::Area => ("m²", "ft²"),
            UnitDomain::DataSize => ("MB", "MiB"),
        }
    }

    /// The process-wide table for this domain
    pub fn table(&self) -> &'static UnitTable {
        match self {
            UnitDomain::Length => &LENGTH,
            UnitDomain::Weight => &WEIGHT,
            UnitDomain::Temperature => &TEMPERATURE,
            UnitDomain::Speed => &SPEED,
            UnitDomain::Volume => &VOLUME,
            UnitDomain::Area => &AREA,
            UnitDomain::DataSize => &DATA_SIZE,
        }
    }
}

impl fmt::Display for UnitDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitDomain {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "length" => Ok(UnitDomain::Length),
            "weight" | "mass" => Ok(UnitDomain::Weight),
            "temperature" | "temp" => Ok(UnitDomain::Temperature),
            "speed" => Ok(UnitDomain::Speed),
            "volume" => Ok(UnitDomain::Volume),
            "area" => Ok(UnitDomain::Area),
            "data" | "data-size" | "datasize" => Ok(UnitDomain::DataSize),
            _ => Err(CalcError::invalid_input(
                "domain",
                s,
                "Expected one of: length, weight, temperature, speed, volume, area, data",
            )),
        }
    }
}

// ============================================================================
// Tables
// ============================================================================

/// An immutable list of units for one domain, indexed by symbol.
#[derive(Debug, Clone)]
pub struct UnitTable {
    domain: UnitDomain,
    units: Vec<Unit>,
    index: HashMap<&'static str, usize>,
}

impl UnitTable {
    /// Build a validated table.
    ///
    /// Rejects duplicate symbols, linear units whose factor is not a finite
    /// positive number, and units that supply only one of the two transforms.
    pub fn new(domain: UnitDomain, units: Vec<Unit>) -> CalcResult<Self> {
        let table = Self::build(domain, units);
        table.validate()?;
        Ok(table)
    }

    fn build(domain: UnitDomain, units: Vec<Unit>) -> Self {
        let mut index = HashMap::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            index.entry(unit.symbol).or_insert(i);
        }
        UnitTable { domain, units, index }
    }

    /// Check the table invariants.
    pub fn validate(&self) -> CalcResult<()> {
        if self.index.len() != self.units.len() {
            let duplicate = self
                .units
                .iter()
                .enumerate()
                .find(|(i, u)| self.index.get(u.symbol) != Some(i))
                .map(|(_, u)| u.symbol)
                .unwrap_or("?");
            return Err(CalcError::invalid_input(
                "symbol",
                duplicate,
                format!("Duplicate symbol in {} table", self.domain),
            ));
        }
        for unit in &self.units {
            match (unit.transform_to, unit.transform_from) {
                (None, None) => {
                    if !unit.factor.is_finite() || unit.factor <= 0.0 {
                        return Err(CalcError::invalid_input(
                            "factor",
                            unit.factor.to_string(),
                            format!("Unit '{}' needs a finite positive factor", unit.symbol),
                        ));
                    }
                }
                (Some(_), Some(_)) => {}
                _ => {
                    return Err(CalcError::invalid_input(
                        "transform",
                        unit.symbol,
                        "Units with a transform must supply both directions",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Domain this table measures
    pub fn domain(&self) -> UnitDomain {
        self.domain
    }

    /// Units in display order
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Look up a unit by exact symbol
    pub fn get(&self, symbol: &str) -> Option<&Unit> {
        self.index.get(symbol).map(|&i| &self.units[i])
    }

    /// Look up a unit by exact symbol, failing with `UnknownUnit`
    pub fn lookup(&self, symbol: &str) -> CalcResult<&Unit> {
        self.get(symbol)
            .ok_or_else(|| CalcError::unknown_unit(symbol, self.domain.name()))
    }

    /// Symbols in display order
    pub fn symbols(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.units.iter().map(|u| u.symbol)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Supplies the unit table for a domain.
///
/// The conversion engine takes plain unit slices; this trait is the seam a
/// presentation layer uses to pick a table.
pub trait UnitTableProvider {
    fn units(&self, domain: UnitDomain) -> &UnitTable;
}

/// Provider backed by the built-in static tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticUnitTables;

impl UnitTableProvider for StaticUnitTables {
    fn units(&self, domain: UnitDomain) -> &UnitTable {
        domain.table()
    }
}

// ============================================================================
// Built-in unit data
// ============================================================================

fn identity(c: f64) -> f64 {
    c
}

fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

fn celsius_to_fahrenheit(c: f64) -> f64 {
    (c * 9.0 / 5.0) + 32.0
}

fn kelvin_to_celsius(k: f64) -> f64 {
    k - 273.15
}

fn celsius_to_kelvin(c: f64) -> f64 {
    c + 273.15
}

const LENGTH_UNITS: [Unit; 8] = [
    Unit::linear("Meter", "m", 1.0),
    Unit::linear("Kilometer", "km", 1000.0),
    Unit::linear("Centimeter", "cm", 0.01),
    Unit::linear("Millimeter", "mm", 0.001),
    Unit::linear("Mile", "mi", 1609.34),
    Unit::linear("Yard", "yd", 0.9144),
    Unit::linear("Foot", "ft", 0.3048),
    Unit::linear("Inch", "in", 0.0254),
];

const WEIGHT_UNITS: [Unit; 6] = [
    Unit::linear("Gram", "g", 1.0),
    Unit::linear("Kilogram", "kg", 1000.0),
    Unit::linear("Milligram", "mg", 0.001),
    Unit::linear("Tonne", "t", 1_000_000.0),
    Unit::linear("Pound", "lb", 453.592),
    Unit::linear("Ounce", "oz", 28.3495),
];

const TEMPERATURE_UNITS: [Unit; 3] = [
    Unit::affine("Celsius", "°C", identity, identity),
    Unit::affine("Fahrenheit", "°F", fahrenheit_to_celsius, celsius_to_fahrenheit),
    Unit::affine("Kelvin", "K", kelvin_to_celsius, celsius_to_kelvin),
];

const SPEED_UNITS: [Unit; 5] = [
    Unit::linear("Meters/second", "m/s", 1.0),
    Unit::linear("Kilometers/hour", "km/h", 0.277778),
    Unit::linear("Miles/hour", "mph", 0.44704),
    Unit::linear("Feet/second", "ft/s", 0.3048),
    Unit::linear("Knot", "kn", 0.514444),
];

const VOLUME_UNITS: [Unit; 8] = [
    Unit::linear("Liter", "L", 1.0),
    Unit::linear("Milliliter", "mL", 0.001),
    Unit::linear("Cubic Meter", "m³", 1000.0),
    Unit::linear("Gallon (US)", "gal", 3.78541),
    Unit::linear("Quart (US)", "qt", 0.946353),
    Unit::linear("Pint (US)", "pt", 0.473176),
    Unit::linear("Cup (US)", "cup", 0.236588),
    Unit::linear("Fluid Ounce (US)", "fl oz", 0.0295735),
];

const AREA_UNITS: [Unit; 7] = [
    Unit::linear("Square Meter", "m²", 1.0),
    Unit::linear("Square Kilometer", "km²", 1_000_000.0),
    Unit::linear("Square Mile", "mi²", 2_589_990.0),
    Unit::linear("Hectare", "ha", 10_000.0),
    Unit::linear("Acre", "acre", 4046.86),
    Unit::linear("Square Foot", "ft²", 0.092903),
    Unit::linear("Square Inch", "in²", 0.00064516),
];

// Binary multiples throughout, including the "KB"/"MB" labels.
const DATA_SIZE_UNITS: [Unit; 9] = [
    Unit::linear("Byte", "B", 1.0),
    Unit::linear("Kilobyte", "KB", 1024.0),
    Unit::linear("Megabyte", "MB", 1_048_576.0),
    Unit::linear("Gigabyte", "GB", 1_073_741_824.0),
    Unit::linear("Terabyte", "TB", 1_099_511_627_776.0),
    Unit::linear("Petabyte", "PB", 1_125_899_906_842_624.0),
    Unit::linear("Bit", "bit", 0.125),
    Unit::linear("Kibibyte", "KiB", 1024.0),
    Unit::linear("Mebibyte", "MiB", 1_048_576.0),
];

static LENGTH: Lazy<UnitTable> = Lazy::new(|| UnitTable::build(UnitDomain::Length, LENGTH_UNITS.to_vec()));
static WEIGHT: Lazy<UnitTable> = Lazy::new(|| UnitTable::build(UnitDomain::Weight, WEIGHT_UNITS.to_vec()));
static TEMPERATURE: Lazy<UnitTable> =
    Lazy::new(|| UnitTable::build(UnitDomain::Temperature, TEMPERATURE_UNITS.to_vec()));
static SPEED: Lazy<UnitTable> = Lazy::new(|| UnitTable::build(UnitDomain::Speed, SPEED_UNITS.to_vec()));
static VOLUME: Lazy<UnitTable> = Lazy::new(|| UnitTable::build(UnitDomain::Volume, VOLUME_UNITS.to_vec()));
static AREA: Lazy<UnitTable> = Lazy::new(|| UnitTable::build(UnitDomain::Area, AREA_UNITS.to_vec()));
static DATA_SIZE: Lazy<UnitTable> =
    Lazy::new(|| UnitTable::build(UnitDomain::DataSize, DATA_SIZE_UNITS.to_vec()));
