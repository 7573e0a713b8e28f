//! # Arithmetic Expression Evaluator
//!
//! Tokenizer plus recursive-descent parser for calculator input. No
//! dynamic code execution; anything outside the grammar is an
//! `EvaluationError`.
//!
//! ```text
//! expr    = term (('+' | '-') term)*
//! term    = unary (('*' | '/') unary)*
//! unary   = ('+' | '-') unary | power
//! power   = primary ('**' unary)?        right associative
//! primary = number | '(' expr ')'
//! ```
//!
//! `**` binds tighter than unary minus, so `-2**2` is `-4`, and signs may
//! repeat (`--5` is `5`). A browser evaluating the same text as script
//! rejects both forms; here they are accepted. Nesting is bounded, and
//! deeper input is an `EvaluationError`.
//!
//! The display glyphs `×`, `÷` and `−` are accepted. Numbers may use
//! scientific notation (`1.5e-7`) so results can be fed back in as input.
//!
//! The basic calculator's function keys (`sin`, `√`, `x!`, ...) act on
//! the current value rather than on an expression: see [`apply_function`].
//!
//! ## Example
//!
//! ```rust
//! use calc_core::expression::evaluate;
//!
//! assert_eq!(evaluate("2+3×4")?, 14.0);
//! assert_eq!(evaluate("0.1 + 0.2")?, 0.3);
//! assert!(evaluate("5/0").is_err());
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::history::HistoryEntryDraft;
use crate::precision::{self, format_number};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    StarStar,
    LParen,
    RParen,
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Neg(Box<Expr>),
    BinOp(Box<Expr>, Op, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Replace display glyphs with their ASCII operators.
fn normalize(input: &str) -> String {
    input.replace('×', "*").replace('÷', "/").replace('−', "-")
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::StarStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Exponent part only when digits follow: "2e" is not a number
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", literal))?;
                tokens.push(Token::Number(value));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

/// Bound on nested parentheses, signs and exponents.
const MAX_DEPTH: usize = 256;

/// Bound on input length in tokens; evaluation recurses over the tree.
const MAX_TOKENS: usize = 20_000;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => Op::Add,
                Some(Token::Minus) => Op::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::BinOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    // term = unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => Op::Mul,
                Some(Token::Slash) => Op::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    // unary = ('+' | '-') unary | power
    fn parse_unary(&mut self) -> Result<Expr, String> {
        if self.depth >= MAX_DEPTH {
            return Err("expression nested too deeply".to_string());
        }
        self.depth += 1;
        let expr = self.parse_signed();
        self.depth -= 1;
        expr
    }

    fn parse_signed(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    // power = primary ('**' unary)?
    fn parse_power(&mut self) -> Result<Expr, String> {
        let base = self.parse_primary()?;
        if self.peek() == Some(Token::StarStar) {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::BinOp(Box::new(base), Op::Pow, Box::new(exponent)));
        }
        Ok(base)
    }

    // primary = number | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Num(n)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("missing closing ')'".to_string()),
                }
            }
            Some(Token::RParen) => Err("unexpected ')'".to_string()),
            Some(_) => Err("operator without operand".to_string()),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

/// Parse an expression into a tree without evaluating it.
pub fn parse(input: &str) -> CalcResult<Expr> {
    let normalized = normalize(input);
    let tokens = tokenize(&normalized).map_err(|reason| CalcError::evaluation(input, reason))?;
    if tokens.is_empty() {
        return Err(CalcError::evaluation(input, "empty expression"));
    }
    if tokens.len() > MAX_TOKENS {
        return Err(CalcError::evaluation(input, "expression too long"));
    }

    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr().map_err(|reason| CalcError::evaluation(input, reason))?;
    if parser.pos < parser.tokens.len() {
        let reason = match parser.peek() {
            Some(Token::RParen) => "unmatched ')'",
            _ => "unexpected tokens at end of expression",
        };
        return Err(CalcError::evaluation(input, reason));
    }
    Ok(expr)
}

impl Expr {
    /// Raw IEEE-754 value of the tree. May be infinite or NaN.
    pub fn value(&self) -> f64 {
        match self {
            Expr::Num(n) => *n,
            Expr::Neg(inner) => -inner.value(),
            Expr::BinOp(left, op, right) => {
                let (l, r) = (left.value(), right.value());
                match op {
                    Op::Add => l + r,
                    Op::Sub => l - r,
                    Op::Mul => l * r,
                    Op::Div => l / r,
                    Op::Pow => l.powf(r),
                }
            }
        }
    }
}

/// Evaluate an expression to a finite number rounded to 15 significant
/// digits.
///
/// # Errors
///
/// `EvaluationError` for empty input, malformed syntax, unmatched
/// parentheses, trailing operators, or a non-finite result.
pub fn evaluate(expression: &str) -> CalcResult<f64> {
    let value = parse(expression)?.value();
    if !value.is_finite() {
        return Err(CalcError::evaluation(expression, "result is not a finite number"));
    }
    Ok(precision::ARITHMETIC.apply(value))
}

/// The `%` key: evaluate, then divide by 100.
pub fn percent_of_expression(expression: &str) -> CalcResult<f64> {
    let value = evaluate(expression)?;
    Ok(precision::ARITHMETIC.apply(value / 100.0))
}

/// History entry for an evaluated expression
pub fn history_entry(expression: &str, value: f64) -> HistoryEntryDraft {
    HistoryEntryDraft::new(expression, format_number(value))
}

// ============================================================================
// Function keys
// ============================================================================

/// Unary function keys of the scientific keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryFunction {
    /// Sine of an angle in degrees
    Sin,
    Cos,
    Tan,
    Ln,
    Log10,
    Sqrt,
    Square,
    Cube,
    Factorial,
    /// Replaces the current value with π
    Pi,
    /// Replaces the current value with e
    E,
}

impl UnaryFunction {
    pub const ALL: [UnaryFunction; 11] = [
        UnaryFunction::Sin,
        UnaryFunction::Cos,
        UnaryFunction::Tan,
        UnaryFunction::Ln,
        UnaryFunction::Log10,
        UnaryFunction::Sqrt,
        UnaryFunction::Square,
        UnaryFunction::Cube,
        UnaryFunction::Factorial,
        UnaryFunction::Pi,
        UnaryFunction::E,
    ];

    /// Keypad glyph
    pub fn key(&self) -> &'static str {
        match self {
            UnaryFunction::Sin => "sin",
            UnaryFunction::Cos => "cos",
            UnaryFunction::Tan => "tan",
            UnaryFunction::Ln => "ln",
            UnaryFunction::Log10 => "log",
            UnaryFunction::Sqrt => "√",
            UnaryFunction::Square => "x²",
            UnaryFunction::Cube => "x³",
            UnaryFunction::Factorial => "n!",
            UnaryFunction::Pi => "π",
            UnaryFunction::E => "e",
        }
    }

    /// Expression label shown above the result, e.g. `sin(30)` or `5!`.
    pub fn label(&self, value: f64) -> String {
        let v = format_number(value);
        match self {
            UnaryFunction::Sin => format!("sin({})", v),
            UnaryFunction::Cos => format!("cos({})", v),
            UnaryFunction::Tan => format!("tan({})", v),
            UnaryFunction::Ln => format!("ln({})", v),
            UnaryFunction::Log10 => format!("log10({})", v),
            UnaryFunction::Sqrt => format!("√({})", v),
            UnaryFunction::Square => format!("{}²", v),
            UnaryFunction::Cube => format!("{}³", v),
            UnaryFunction::Factorial => format!("{}!", v),
            UnaryFunction::Pi => "π".to_string(),
            UnaryFunction::E => "e".to_string(),
        }
    }
}

impl fmt::Display for UnaryFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for UnaryFunction {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let func = match s.trim().to_lowercase().as_str() {
            "sin" => UnaryFunction::Sin,
            "cos" => UnaryFunction::Cos,
            "tan" => UnaryFunction::Tan,
            "ln" => UnaryFunction::Ln,
            "log" | "log10" => UnaryFunction::Log10,
            "√" | "sqrt" => UnaryFunction::Sqrt,
            "x²" | "sq" | "square" => UnaryFunction::Square,
            "x³" | "cube" => UnaryFunction::Cube,
            "!" | "n!" | "x!" | "fact" | "factorial" => UnaryFunction::Factorial,
            "π" | "pi" => UnaryFunction::Pi,
            "e" => UnaryFunction::E,
            _ => {
                return Err(CalcError::invalid_input(
                    "function",
                    s,
                    "Expected one of sin, cos, tan, ln, log, sqrt, sq, cube, !, pi, e",
                ))
            }
        };
        Ok(func)
    }
}

/// Value and display label produced by a function key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub value: f64,
    pub label: String,
}

impl FunctionResult {
    pub fn history_entry(&self) -> HistoryEntryDraft {
        HistoryEntryDraft::new(self.label.clone(), format_number(self.value))
    }
}

/// Apply a function key to the current display value.
///
/// ```rust
/// use calc_core::expression::{apply_function, UnaryFunction};
///
/// let r = apply_function(UnaryFunction::Sin, 30.0)?;
/// assert_eq!((r.value, r.label.as_str()), (0.5, "sin(30)"));
/// # Ok::<(), calc_core::errors::CalcError>(())
/// ```
///
/// # Errors
///
/// * `DomainError` - √ of a negative, ln/log of a non-positive, factorial
///   of a negative or non-integer
/// * `EvaluationError` - the result is not finite
pub fn apply_function(func: UnaryFunction, value: f64) -> CalcResult<FunctionResult> {
    let label = func.label(value);
    let result = match func {
        UnaryFunction::Sin => value.to_radians().sin(),
        UnaryFunction::Cos => value.to_radians().cos(),
        UnaryFunction::Tan => value.to_radians().tan(),
        UnaryFunction::Ln => {
            require_positive_log("ln", value)?;
            value.ln()
        }
        UnaryFunction::Log10 => {
            require_positive_log("log10", value)?;
            value.log10()
        }
        UnaryFunction::Sqrt => {
            if value < 0.0 {
                return Err(CalcError::domain("√", format_number(value), "square root of a negative number"));
            }
            value.sqrt()
        }
        UnaryFunction::Square => value.powi(2),
        UnaryFunction::Cube => value.powi(3),
        UnaryFunction::Factorial => factorial(value)?,
        UnaryFunction::Pi => std::f64::consts::PI,
        UnaryFunction::E => std::f64::consts::E,
    };

    if !result.is_finite() {
        return Err(CalcError::evaluation(label, "result is not a finite number"));
    }

    Ok(FunctionResult {
        value: precision::ARITHMETIC.apply(result),
        label,
    })
}

fn require_positive_log(operation: &str, value: f64) -> CalcResult<()> {
    if value <= 0.0 || value.is_nan() {
        return Err(CalcError::domain(
            operation,
            format_number(value),
            "logarithm of a non-positive number",
        ));
    }
    Ok(())
}

/// `n!` for a non-negative integer `n`.
///
/// # Errors
///
/// * `DomainError` - `n` is negative or not an integer
/// * `EvaluationError` - the result overflows (`n > 170`)
pub fn factorial(n: f64) -> CalcResult<f64> {
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::domain(
            "factorial",
            format_number(n),
            "defined only for non-negative integers",
        ));
    }
    let mut result = 1.0_f64;
    let mut i = 2.0;
    while i <= n {
        result *= i;
        if result.is_infinite() {
            return Err(CalcError::evaluation(format!("{}!", format_number(n)), "result is too large"));
        }
        i += 1.0;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str) -> f64 {
        evaluate(expr).unwrap()
    }

    fn assert_eval_error(expr: &str) {
        match evaluate(expr) {
            Err(CalcError::EvaluationError { .. }) => {}
            other => panic!("expected EvaluationError for {:?}, got {:?}", expr, other),
        }
    }

    #[test]
    fn test_tokenize_operators() {
        let tokens = tokenize("2**3 * (1 - 4)").unwrap();
        assert_eq!(tokens.len(), 9);
        assert_eq!(tokens[1], Token::StarStar);
        assert_eq!(tokens[3], Token::Star);
    }

    #[test]
    fn test_tokenize_scientific_literals() {
        assert_eq!(tokenize("1.5e-7").unwrap(), vec![Token::Number(1.5e-7)]);
        assert_eq!(tokenize("2E+3").unwrap(), vec![Token::Number(2000.0)]);
        assert!(tokenize("2e").is_err());
        assert!(tokenize("1.2.3").is_err());
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3×4"), 14.0);
        assert_eq!(eval("(2+3)×2"), 10.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("100 ÷ 10 ÷ 2"), 5.0);
        assert_eq!(eval("2 × 3 + 4 × 5"), 26.0);
    }

    #[test]
    fn test_power() {
        assert_eq!(eval("2**10"), 1024.0);
        assert_eq!(eval("2**3**2"), 512.0);
        assert_eq!(eval("-2**2"), -4.0);
        assert_eq!(eval("(-2)**2"), 4.0);
        assert_eq!(eval("2**-1"), 0.5);
        assert_eq!(eval("3*2**2"), 12.0);
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(eval("-5"), -5.0);
        assert_eq!(eval("+5"), 5.0);
        assert_eq!(eval("--5"), 5.0);
        assert_eq!(eval("3 − −2"), 5.0);
        assert_eq!(eval("2*-3"), -6.0);
    }

    #[test]
    fn test_rounds_to_fifteen_digits() {
        assert_eq!(eval("0.1+0.2"), 0.3);
        assert_eq!(eval("1/3"), 0.333333333333333);
        assert_eq!(eval("1.5e-7 * 2"), 3e-7);
    }

    #[test]
    fn test_errors() {
        assert_eval_error("");
        assert_eval_error("   ");
        assert_eval_error("5/0");
        assert_eval_error("0/0");
        assert_eval_error("(2+3");
        assert_eval_error("2+3)");
        assert_eval_error("2+");
        assert_eval_error("2×");
        assert_eval_error("*2");
        assert_eval_error("2 3");
        assert_eval_error("2(3)");
        assert_eval_error("alert(1)");
        assert_eval_error("10**400");
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        assert_eval_error(&"(".repeat(10_000));
        assert_eval_error(&"-".repeat(10_000));
        assert_eval_error(&format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000)));
        assert_eval_error(&format!("{}1", "-".repeat(5_000)));
        assert_eval_error(&vec!["2"; 5_000].join("**"));

        assert_eq!(eval(&format!("{}1{}", "(".repeat(100), ")".repeat(100))), 1.0);
        assert_eq!(eval(&format!("{}1", "-".repeat(100))), 1.0);
    }

    #[test]
    fn test_overlong_expression_is_an_error() {
        assert_eval_error(&vec!["1"; 20_000].join("+"));
        assert_eq!(eval(&vec!["1"; 1_000].join("+")), 1000.0);
    }

    #[test]
    fn test_percent_of_expression() {
        assert_eq!(percent_of_expression("50").unwrap(), 0.5);
        assert_eq!(percent_of_expression("200+50").unwrap(), 2.5);
        assert!(percent_of_expression("5/0").is_err());
    }

    #[test]
    fn test_function_values_and_labels() {
        let cases = [
            (UnaryFunction::Sin, 30.0, 0.5, "sin(30)"),
            (UnaryFunction::Cos, 60.0, 0.5, "cos(60)"),
            (UnaryFunction::Tan, 45.0, 1.0, "tan(45)"),
            (UnaryFunction::Ln, 1.0, 0.0, "ln(1)"),
            (UnaryFunction::Log10, 100.0, 2.0, "log10(100)"),
            (UnaryFunction::Sqrt, 9.0, 3.0, "√(9)"),
            (UnaryFunction::Square, 4.0, 16.0, "4²"),
            (UnaryFunction::Cube, 2.0, 8.0, "2³"),
            (UnaryFunction::Factorial, 5.0, 120.0, "5!"),
        ];
        for (func, input, expected, label) in cases {
            let result = apply_function(func, input).unwrap();
            assert_eq!(result.value, expected, "{:?}({})", func, input);
            assert_eq!(result.label, label);
        }
    }

    #[test]
    fn test_constants_ignore_current_value() {
        let pi = apply_function(UnaryFunction::Pi, 42.0).unwrap();
        assert_eq!(pi.value, 3.14159265358979);
        assert_eq!(pi.label, "π");
        assert_eq!(apply_function(UnaryFunction::E, 0.0).unwrap().value, 2.71828182845905);
    }

    #[test]
    fn test_function_domain_errors() {
        for (func, input) in [
            (UnaryFunction::Sqrt, -4.0),
            (UnaryFunction::Ln, 0.0),
            (UnaryFunction::Log10, -1.0),
            (UnaryFunction::Factorial, -1.0),
            (UnaryFunction::Factorial, 2.5),
        ] {
            assert!(
                matches!(apply_function(func, input), Err(CalcError::DomainError { .. })),
                "{:?}({})",
                func,
                input
            );
        }
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0.0).unwrap(), 1.0);
        assert_eq!(factorial(5.0).unwrap(), 120.0);
        assert_eq!(factorial(20.0).unwrap(), 2432902008176640000.0);
        assert!(matches!(factorial(-1.0), Err(CalcError::DomainError { .. })));
        assert!(matches!(factorial(2.5), Err(CalcError::DomainError { .. })));
        assert!(matches!(factorial(171.0), Err(CalcError::EvaluationError { .. })));
    }

    #[test]
    fn test_function_from_str() {
        assert_eq!("sqrt".parse::<UnaryFunction>().unwrap(), UnaryFunction::Sqrt);
        assert_eq!("√".parse::<UnaryFunction>().unwrap(), UnaryFunction::Sqrt);
        assert_eq!("!".parse::<UnaryFunction>().unwrap(), UnaryFunction::Factorial);
        assert_eq!("PI".parse::<UnaryFunction>().unwrap(), UnaryFunction::Pi);
        assert!("cosh".parse::<UnaryFunction>().is_err());
    }

    #[test]
    fn test_history_entry() {
        let entry = history_entry("2+3×4", 14.0);
        assert_eq!(entry.expression, "2+3×4");
        assert_eq!(entry.result, "14");
    }
}
