//! Arithmetic operation strategies.
//!
//! Each operation is a stateless type implementing [`Operation`]: a pure
//! binary function over decimals that validates its own domain. All numeric
//! work uses `rust_decimal` arithmetic, never binary floating point, so
//! financial-style inputs round-trip without artifacts.
//!
//! Unlike the unbounded decimal contexts of some environments, `Decimal` has
//! a fixed 96-bit mantissa, so every operation goes through checked
//! arithmetic and reports overflow as a validation error instead of
//! panicking.

mod factory;

pub use factory::OperationFactory;

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal::prelude::ToPrimitive;

use crate::error::{CalcError, CalcResult};

/// A pure binary arithmetic operation over decimals.
///
/// Implementations are stateless function objects. `execute` fails with
/// [`CalcError::Validation`] when the operand pair falls in the operation's
/// invalid domain, and never mutates anything.
pub trait Operation: std::fmt::Debug {
    /// Apply the operation to the operands.
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal>;

    /// Human-readable name, as recorded in history ("Addition", "Root", ...).
    fn name(&self) -> &'static str;
}

fn overflow() -> CalcError {
    CalcError::validation("Result exceeds supported precision")
}

/// Strip Newton/power approximation noise: results like `2.9999...9` become
/// `3`. 25 decimal places is well inside the 28-digit context, so genuine
/// results are untouched.
fn round_clean(value: Decimal) -> Decimal {
    value.round_dp(25).normalize()
}

/// Positive integer nth root of a positive decimal, by Newton iteration.
fn nth_root(a: Decimal, n: i64) -> CalcResult<Decimal> {
    debug_assert!(n > 0 && a > Decimal::ZERO);
    if n == 1 {
        return Ok(a);
    }
    let n_dec = Decimal::from(n);
    let n_minus_one = n_dec - Decimal::ONE;
    let tolerance = Decimal::new(1, 26);
    let mut x = if a > Decimal::ONE { a / n_dec } else { a };
    if x <= Decimal::ZERO {
        x = Decimal::ONE;
    }
    for _ in 0..200 {
        let denom = x.checked_powi(n - 1).ok_or_else(overflow)?;
        if denom.is_zero() {
            return Err(overflow());
        }
        let quotient = a.checked_div(denom).ok_or_else(overflow)?;
        let next = n_minus_one
            .checked_mul(x)
            .and_then(|t| t.checked_add(quotient))
            .and_then(|t| t.checked_div(n_dec))
            .ok_or_else(overflow)?;
        let step = next.checked_sub(x).map(|d| d.abs()).ok_or_else(overflow)?;
        x = next;
        if step <= tolerance {
            break;
        }
    }
    Ok(round_clean(x))
}

/// Total function: `a + b`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Addition;

impl Operation for Addition {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        a.checked_add(b).ok_or_else(overflow)
    }

    fn name(&self) -> &'static str {
        "Addition"
    }
}

/// Total function: `a - b`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Subtraction;

impl Operation for Subtraction {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        a.checked_sub(b).ok_or_else(overflow)
    }

    fn name(&self) -> &'static str {
        "Subtraction"
    }
}

/// Total function: `a * b`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Multiplication;

impl Operation for Multiplication {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        a.checked_mul(b).ok_or_else(overflow)
    }

    fn name(&self) -> &'static str {
        "Multiplication"
    }
}

/// `a / b`, rejecting a zero divisor.
#[derive(Debug, Default, Clone, Copy)]
pub struct Division;

impl Operation for Division {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        if b.is_zero() {
            return Err(CalcError::validation("Division by zero is not allowed"));
        }
        a.checked_div(b).ok_or_else(overflow)
    }

    fn name(&self) -> &'static str {
        "Division"
    }
}

/// `a ^ b` for non-negative exponents; `a^0 = 1` for all `a`, including 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct Power;

impl Operation for Power {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        if b < Decimal::ZERO {
            return Err(CalcError::validation("Negative exponents not supported"));
        }
        if b.fract().is_zero() {
            let exponent = b.to_i64().ok_or_else(overflow)?;
            a.checked_powi(exponent).ok_or_else(overflow)
        } else {
            if a < Decimal::ZERO {
                return Err(CalcError::validation(
                    "Cannot raise a negative base to a fractional exponent",
                ));
            }
            a.checked_powd(b).map(round_clean).ok_or_else(overflow)
        }
    }

    fn name(&self) -> &'static str {
        "Power"
    }
}

/// `a ^ (1/b)`: the bth root of a.
///
/// Rejects a zero degree and a negative radicand; the degenerate
/// `a == 0, b < 0` corner is also rejected (zero is not treated as a fixed
/// point for negative-degree roots).
#[derive(Debug, Default, Clone, Copy)]
pub struct Root;

impl Operation for Root {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        if b.is_zero() {
            return Err(CalcError::validation("Zero root is undefined"));
        }
        if a < Decimal::ZERO {
            return Err(CalcError::validation(
                "Cannot calculate root of negative number",
            ));
        }
        if a.is_zero() {
            if b < Decimal::ZERO {
                return Err(CalcError::validation("Invalid root operation"));
            }
            return Ok(Decimal::ZERO);
        }
        if b.fract().is_zero() {
            let degree = b.to_i64().ok_or_else(overflow)?;
            if degree < 0 {
                let inverse = nth_root(a, -degree)?;
                return Decimal::ONE
                    .checked_div(inverse)
                    .map(round_clean)
                    .ok_or_else(overflow);
            }
            nth_root(a, degree)
        } else {
            let exponent = Decimal::ONE.checked_div(b).ok_or_else(overflow)?;
            a.checked_powd(exponent).map(round_clean).ok_or_else(overflow)
        }
    }

    fn name(&self) -> &'static str {
        "Root"
    }
}

/// `a % b` with truncated remainder semantics: the result takes the sign
/// of `a`, matching decimal remainder behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct Modulus;

impl Operation for Modulus {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        if b.is_zero() {
            return Err(CalcError::validation("Modulus by zero is not allowed"));
        }
        a.checked_rem(b).ok_or_else(overflow)
    }

    fn name(&self) -> &'static str {
        "Modulus"
    }
}

/// Floor division: `floor(a / b)`, so `-10 intdiv 3 = -4` and
/// `-10 intdiv -3 = 3`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerDivision;

impl Operation for IntegerDivision {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        if b.is_zero() {
            return Err(CalcError::validation("Division by zero is not allowed"));
        }
        a.checked_div(b).map(|q| q.floor()).ok_or_else(overflow)
    }

    fn name(&self) -> &'static str {
        "IntegerDivision"
    }
}

/// `a / b * 100`: what percentage of `b` is `a`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Percentage;

impl Operation for Percentage {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        if b.is_zero() {
            return Err(CalcError::validation(
                "Cannot calculate percentage with zero denominator",
            ));
        }
        a.checked_div(b)
            .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(overflow)
    }

    fn name(&self) -> &'static str {
        "Percentage"
    }
}

/// Total function: `|a - b|`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbsoluteDifference;

impl Operation for AbsoluteDifference {
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        a.checked_sub(b).map(|d| d.abs()).ok_or_else(overflow)
    }

    fn name(&self) -> &'static str {
        "AbsoluteDifference"
    }
}
