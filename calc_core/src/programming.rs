//! # Programmer Tools
//!
//! 32-bit bitwise operations and radix conversion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::history::HistoryEntryDraft;

// ============================================================================
// Bitwise
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
    Not,
    #[serde(rename = "LSHIFT")]
    ShiftLeft,
    #[serde(rename = "RSHIFT")]
    ShiftRight,
}

impl BitwiseOp {
    /// NOT and the shifts take a single operand.
    pub fn is_unary(self) -> bool {
        matches!(self, BitwiseOp::Not | BitwiseOp::ShiftLeft | BitwiseOp::ShiftRight)
    }
}

impl FromStr for BitwiseOp {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AND" | "&" => Ok(BitwiseOp::And),
            "OR" | "|" => Ok(BitwiseOp::Or),
            "XOR" | "^" => Ok(BitwiseOp::Xor),
            "NOT" | "~" => Ok(BitwiseOp::Not),
            "LSHIFT" | "SHL" | "<<" => Ok(BitwiseOp::ShiftLeft),
            "RSHIFT" | "SHR" | ">>" => Ok(BitwiseOp::ShiftRight),
            _ => Err(CalcError::invalid_input(
                "operation",
                s,
                "Expected AND, OR, XOR, NOT, LSHIFT or RSHIFT",
            )),
        }
    }
}

/// Operands as entered. Values outside `i32` wrap modulo 2³².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitwiseInput {
    pub operation: BitwiseOp,
    pub left: i64,
    /// Second operand for AND/OR/XOR
    #[serde(default)]
    pub right: Option<i64>,
    /// Shift count for LSHIFT/RSHIFT
    #[serde(default)]
    pub shift: Option<i64>,
}

impl BitwiseInput {
    pub fn validate(&self) -> CalcResult<()> {
        match self.operation {
            BitwiseOp::And | BitwiseOp::Or | BitwiseOp::Xor if self.right.is_none() => Err(
                CalcError::invalid_input("right", "", "This operation needs a second number"),
            ),
            BitwiseOp::ShiftLeft | BitwiseOp::ShiftRight if self.shift.is_none() => Err(
                CalcError::invalid_input("shift", "", "Shift operations need a shift amount"),
            ),
            _ => Ok(()),
        }
    }

    /// `10 & 5`, `~10`, `10 << 2`
    pub fn expression(&self) -> String {
        let right = self.right.unwrap_or_default();
        let shift = self.shift.unwrap_or_default();
        match self.operation {
            BitwiseOp::And => format!("{} & {}", self.left, right),
            BitwiseOp::Or => format!("{} | {}", self.left, right),
            BitwiseOp::Xor => format!("{} ^ {}", self.left, right),
            BitwiseOp::Not => format!("~{}", self.left),
            BitwiseOp::ShiftLeft => format!("{} << {}", self.left, shift),
            BitwiseOp::ShiftRight => format!("{} >> {}", self.left, shift),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitwiseResult {
    pub value: i32,
    pub decimal: String,
    /// Two's complement, at least 8 digits
    pub binary: String,
    /// `0x` + two's complement, uppercase
    pub hex: String,
}

impl BitwiseResult {
    fn new(value: i32) -> Self {
        let bits = value as u32;
        BitwiseResult {
            value,
            decimal: value.to_string(),
            binary: format!("{:08b}", bits),
            hex: format!("0x{:X}", bits),
        }
    }

    pub fn history_entry(&self, input: &BitwiseInput) -> HistoryEntryDraft {
        HistoryEntryDraft::new(input.expression(), self.decimal.clone())
    }
}

pub fn calculate_bitwise(input: &BitwiseInput) -> CalcResult<BitwiseResult> {
    input.validate()?;
    let left = input.left as i32;
    let right = input.right.unwrap_or_default() as i32;
    let shift = (input.shift.unwrap_or_default() as u32) & 0x1F;

    let value = match input.operation {
        BitwiseOp::And => left & right,
        BitwiseOp::Or => left | right,
        BitwiseOp::Xor => left ^ right,
        BitwiseOp::Not => !left,
        BitwiseOp::ShiftLeft => left.wrapping_shl(shift),
        BitwiseOp::ShiftRight => left.wrapping_shr(shift),
    };
    Ok(BitwiseResult::new(value))
}

// ============================================================================
// Number base
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Radix {
    Binary,
    Octal,
    Decimal,
    Hexadecimal,
}

impl Radix {
    pub const ALL: [Radix; 4] = [Radix::Binary, Radix::Octal, Radix::Decimal, Radix::Hexadecimal];

    pub fn base(self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hexadecimal => 16,
        }
    }

    pub fn from_base(base: u32) -> CalcResult<Self> {
        Radix::ALL
            .into_iter()
            .find(|r| r.base() == base)
            .ok_or_else(|| CalcError::unknown_unit(base.to_string(), "base"))
    }

    fn render(self, value: u128) -> String {
        match self {
            Radix::Binary => format!("{:b}", value),
            Radix::Octal => format!("{:o}", value),
            Radix::Decimal => value.to_string(),
            Radix::Hexadecimal => format!("{:X}", value),
        }
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Radix::Binary => "Binary",
            Radix::Octal => "Octal",
            Radix::Decimal => "Decimal",
            Radix::Hexadecimal => "Hexadecimal",
        };
        f.write_str(name)
    }
}

impl FromStr for Radix {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "2" | "bin" | "binary" => Ok(Radix::Binary),
            "8" | "oct" | "octal" => Ok(Radix::Octal),
            "10" | "dec" | "decimal" => Ok(Radix::Decimal),
            "16" | "hex" | "hexadecimal" => Ok(Radix::Hexadecimal),
            _ => Err(CalcError::unknown_unit(s, "base")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseConversion {
    pub input: String,
    pub from: Radix,
    pub to: Radix,
    /// Empty when the input was empty
    pub output: String,
}

impl BaseConversion {
    /// `1010 (base 2) to base 10` = `10`
    pub fn history_entry(&self) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("{} (base {}) to base {}", self.input, self.from.base(), self.to.base()),
            self.output.clone(),
        )
    }
}

/// Convert an unsigned digit string between bases.
pub fn convert_base(input: &str, from: Radix, to: Radix) -> CalcResult<BaseConversion> {
    let digits = input.trim();
    let output = if digits.is_empty() {
        String::new()
    } else {
        if !digits.chars().all(|c| c.is_digit(from.base())) {
            return Err(CalcError::invalid_input(
                "value",
                digits,
                format!("Invalid value for base {}", from.base()),
            ));
        }
        let value = u128::from_str_radix(digits, from.base())
            .map_err(|_| CalcError::invalid_input("value", digits, "Number is too large"))?;
        to.render(value)
    };

    Ok(BaseConversion {
        input: digits.to_string(),
        from,
        to,
        output,
    })
}
