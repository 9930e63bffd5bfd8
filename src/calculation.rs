//! Immutable calculation records.
//!
//! A [`Calculation`] captures one operation with its operands, result, and
//! timestamp. The result is computed at construction time and never mutated;
//! records loaded from storage are re-validated by recomputing the result,
//! with any mismatch logged and corrected in memory.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::operations::{
    AbsoluteDifference, Addition, Division, IntegerDivision, Modulus, Multiplication, Operation,
    Percentage, Power, Root, Subtraction,
};

/// Parse a raw operand string into a decimal.
///
/// Accepts plain decimal notation and scientific notation ("1e10"). Fails
/// with a validation error describing the rejected input.
pub fn parse_decimal(raw: &str) -> CalcResult<Decimal> {
    let trimmed = raw.trim();
    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    };
    parsed.map_err(|_| CalcError::validation(format!("Invalid number input: '{trimmed}'")))
}

/// One of the ten named arithmetic transformations.
///
/// The serialized form and `Display` are the human-readable names stored in
/// history files ("Addition", ..., "AbsoluteDifference").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Power,
    Root,
    Modulus,
    IntegerDivision,
    Percentage,
    AbsoluteDifference,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        OperationKind::Addition,
        OperationKind::Subtraction,
        OperationKind::Multiplication,
        OperationKind::Division,
        OperationKind::Power,
        OperationKind::Root,
        OperationKind::Modulus,
        OperationKind::IntegerDivision,
        OperationKind::Percentage,
        OperationKind::AbsoluteDifference,
    ];

    /// Human-readable name, as recorded in history files.
    pub fn display_name(&self) -> &'static str {
        match self {
            OperationKind::Addition => "Addition",
            OperationKind::Subtraction => "Subtraction",
            OperationKind::Multiplication => "Multiplication",
            OperationKind::Division => "Division",
            OperationKind::Power => "Power",
            OperationKind::Root => "Root",
            OperationKind::Modulus => "Modulus",
            OperationKind::IntegerDivision => "IntegerDivision",
            OperationKind::Percentage => "Percentage",
            OperationKind::AbsoluteDifference => "AbsoluteDifference",
        }
    }

    /// Short name used by the factory and the REPL command set.
    pub fn command_name(&self) -> &'static str {
        match self {
            OperationKind::Addition => "add",
            OperationKind::Subtraction => "subtract",
            OperationKind::Multiplication => "multiply",
            OperationKind::Division => "divide",
            OperationKind::Power => "power",
            OperationKind::Root => "root",
            OperationKind::Modulus => "modulus",
            OperationKind::IntegerDivision => "intdiv",
            OperationKind::Percentage => "percentage",
            OperationKind::AbsoluteDifference => "absdiff",
        }
    }

    /// Apply this kind's arithmetic to the operands.
    pub fn apply(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal> {
        match self {
            OperationKind::Addition => Addition.execute(a, b),
            OperationKind::Subtraction => Subtraction.execute(a, b),
            OperationKind::Multiplication => Multiplication.execute(a, b),
            OperationKind::Division => Division.execute(a, b),
            OperationKind::Power => Power.execute(a, b),
            OperationKind::Root => Root.execute(a, b),
            OperationKind::Modulus => Modulus.execute(a, b),
            OperationKind::IntegerDivision => IntegerDivision.execute(a, b),
            OperationKind::Percentage => Percentage.execute(a, b),
            OperationKind::AbsoluteDifference => AbsoluteDifference.execute(a, b),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for OperationKind {
    type Err = CalcError;

    /// Accepts both display names ("Addition") and factory command names
    /// ("add"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        for kind in OperationKind::ALL {
            if lowered == kind.display_name().to_lowercase()
                || lowered == kind.command_name()
            {
                return Ok(kind);
            }
        }
        Err(CalcError::UnknownOperation(s.trim().to_string()))
    }
}

/// An immutable snapshot of one performed calculation.
///
/// Invariant: `result` is always re-derivable by reapplying `operation` to
/// `(operand1, operand2)`. Equality is structural over operation, operands,
/// and result; the timestamp is excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calculation {
    pub operation: OperationKind,
    pub operand1: Decimal,
    pub operand2: Decimal,
    pub result: Decimal,
    pub timestamp: DateTime<Local>,
}

impl Calculation {
    /// Build a record by applying the operation to the operands now.
    pub fn new(operation: OperationKind, operand1: Decimal, operand2: Decimal) -> CalcResult<Self> {
        let result = operation.apply(operand1, operand2)?;
        Ok(Self {
            operation,
            operand1,
            operand2,
            result,
            timestamp: Local::now(),
        })
    }

    /// Build a record from a result the bound strategy already computed.
    pub(crate) fn from_result(
        operation: OperationKind,
        operand1: Decimal,
        operand2: Decimal,
        result: Decimal,
    ) -> Self {
        Self {
            operation,
            operand1,
            operand2,
            result,
            timestamp: Local::now(),
        }
    }

    /// Rebuild a record from its flat persisted representation.
    ///
    /// The result is recomputed from the operation and operands; if the
    /// stored value differs, a warning is logged and the recomputed value
    /// wins. Any parse failure is an operation error.
    pub fn from_record(
        operation: &str,
        operand1: &str,
        operand2: &str,
        result: &str,
        timestamp: &str,
    ) -> CalcResult<Self> {
        let kind: OperationKind = operation.parse()?;
        let a = parse_decimal(operand1).map_err(invalid_data)?;
        let b = parse_decimal(operand2).map_err(invalid_data)?;
        let stored = parse_decimal(result).map_err(invalid_data)?;
        let computed = kind.apply(a, b).map_err(invalid_data)?;
        if stored != computed {
            tracing::warn!(
                "Loaded calculation result {stored} differs from computed result {computed}; \
                 keeping the computed value"
            );
        }
        let timestamp = parse_timestamp(timestamp)?;
        Ok(Self {
            operation: kind,
            operand1: a,
            operand2: b,
            result: computed,
            timestamp,
        })
    }

    /// Render the result rounded to a display precision, with trailing
    /// zeros stripped.
    pub fn format_result(&self, precision: u32) -> String {
        self.result.round_dp(precision).normalize().to_string()
    }
}

impl PartialEq for Calculation {
    fn eq(&self, other: &Self) -> bool {
        self.operation == other.operation
            && self.operand1 == other.operand1
            && self.operand2 == other.operand2
            && self.result == other.result
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}) = {}",
            self.operation, self.operand1, self.operand2, self.result
        )
    }
}

fn invalid_data(err: CalcError) -> CalcError {
    CalcError::operation(format!("Invalid calculation data: {err}"))
}

fn parse_timestamp(raw: &str) -> CalcResult<DateTime<Local>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Local));
    }
    // Older files carry naive ISO timestamps without an offset.
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        if let Some(local) = Local.from_local_datetime(&naive).single() {
            return Ok(local);
        }
    }
    Err(CalcError::operation(format!(
        "Invalid calculation data: bad timestamp '{trimmed}'"
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_computes_result() {
        let calc = Calculation::new(OperationKind::Addition, dec("2"), dec("3")).unwrap();
        assert_eq!(calc.result, dec("5"));

        let calc = Calculation::new(OperationKind::Power, dec("2"), dec("3")).unwrap();
        assert_eq!(calc.result, dec("8"));

        let calc = Calculation::new(OperationKind::Root, dec("16"), dec("2")).unwrap();
        assert_eq!(calc.result, dec("4"));
    }

    #[test]
    fn test_new_propagates_domain_errors() {
        let err = Calculation::new(OperationKind::Division, dec("8"), dec("0")).unwrap_err();
        assert_eq!(err.to_string(), "Division by zero is not allowed");
    }

    #[test]
    fn test_equality_ignores_timestamp() {
        let calc1 = Calculation::new(OperationKind::Addition, dec("2"), dec("3")).unwrap();
        let mut calc2 = Calculation::new(OperationKind::Addition, dec("2"), dec("3")).unwrap();
        calc2.timestamp = calc2.timestamp + chrono::Duration::hours(1);
        let calc3 = Calculation::new(OperationKind::Subtraction, dec("5"), dec("3")).unwrap();

        assert_eq!(calc1, calc2);
        assert_ne!(calc1, calc3);
    }

    #[test]
    fn test_display() {
        let calc = Calculation::new(OperationKind::Addition, dec("5"), dec("3")).unwrap();
        assert_eq!(calc.to_string(), "Addition(5, 3) = 8");
    }

    #[test]
    fn test_from_record_round_trip() {
        let original = Calculation::new(OperationKind::Division, dec("10"), dec("4")).unwrap();
        let restored = Calculation::from_record(
            &original.operation.to_string(),
            &original.operand1.to_string(),
            &original.operand2.to_string(),
            &original.result.to_string(),
            &original.timestamp.to_rfc3339(),
        )
        .unwrap();
        assert_eq!(original, restored);
        assert_eq!(original.timestamp, restored.timestamp);
    }

    #[test]
    fn test_from_record_corrects_result_mismatch() {
        let calc = Calculation::from_record(
            "Addition",
            "2",
            "3",
            "10",
            "2024-01-15T10:30:45+00:00",
        )
        .unwrap();
        assert_eq!(calc.result, dec("5"));
    }

    #[test]
    fn test_from_record_invalid_operand() {
        let err = Calculation::from_record(
            "Addition",
            "invalid",
            "3",
            "5",
            "2024-01-15T10:30:45+00:00",
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid calculation data"));
    }

    #[test]
    fn test_from_record_unknown_operation() {
        let err =
            Calculation::from_record("Unknown", "5", "3", "8", "2024-01-15T10:30:45+00:00")
                .unwrap_err();
        assert!(err.to_string().contains("Unknown operation"));
    }

    #[test]
    fn test_from_record_naive_timestamp() {
        let calc =
            Calculation::from_record("Addition", "2", "3", "5", "2024-01-15T10:30:45.123456")
                .unwrap();
        assert_eq!(calc.result, dec("5"));
    }

    #[test]
    fn test_format_result() {
        let calc = Calculation::new(OperationKind::Division, dec("1"), dec("3")).unwrap();
        assert_eq!(calc.format_result(2), "0.33");

        let calc = Calculation::new(OperationKind::Division, dec("10"), dec("4")).unwrap();
        assert_eq!(calc.format_result(5), "2.5");

        let calc = Calculation::new(OperationKind::Division, dec("7"), dec("3")).unwrap();
        assert_eq!(calc.format_result(0), "2");
    }

    #[test]
    fn test_operation_kind_parsing() {
        assert_eq!(
            "Addition".parse::<OperationKind>().unwrap(),
            OperationKind::Addition
        );
        assert_eq!(
            "intdiv".parse::<OperationKind>().unwrap(),
            OperationKind::IntegerDivision
        );
        assert_eq!(
            "ABSDIFF".parse::<OperationKind>().unwrap(),
            OperationKind::AbsoluteDifference
        );
        let err = "bogus".parse::<OperationKind>().unwrap_err();
        assert!(matches!(err, CalcError::UnknownOperation(_)));
        assert_eq!(err.to_string(), "Unknown operation: bogus");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(" 5.5 ").unwrap(), dec("5.5"));
        assert_eq!(parse_decimal("1e3").unwrap(), dec("1000"));
        let err = parse_decimal("not-a-number").unwrap_err();
        assert_eq!(err.to_string(), "Invalid number input: 'not-a-number'");
    }
}
