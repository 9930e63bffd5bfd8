//! Name-based operation lookup and registration.
//!
//! The registry is process-wide mutable state, seeded once with the ten
//! built-in operation kinds under their short command names. Registration of
//! additional kinds at runtime is supported and idempotent; in Rust the
//! "registered type must satisfy the Operation capability" check is enforced
//! by the constructor signature at compile time.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use super::{
    AbsoluteDifference, Addition, Division, IntegerDivision, Modulus, Multiplication, Operation,
    Percentage, Power, Root, Subtraction,
};
use crate::error::{CalcError, CalcResult};

type OperationCtor = Box<dyn Fn() -> Box<dyn Operation> + Send + Sync>;

static REGISTRY: LazyLock<RwLock<HashMap<String, OperationCtor>>> =
    LazyLock::new(|| RwLock::new(builtin_registry()));

fn builtin_registry() -> HashMap<String, OperationCtor> {
    let mut map: HashMap<String, OperationCtor> = HashMap::new();
    map.insert("add".to_string(), Box::new(|| Box::new(Addition)));
    map.insert("subtract".to_string(), Box::new(|| Box::new(Subtraction)));
    map.insert("multiply".to_string(), Box::new(|| Box::new(Multiplication)));
    map.insert("divide".to_string(), Box::new(|| Box::new(Division)));
    map.insert("power".to_string(), Box::new(|| Box::new(Power)));
    map.insert("root".to_string(), Box::new(|| Box::new(Root)));
    map.insert("modulus".to_string(), Box::new(|| Box::new(Modulus)));
    map.insert("intdiv".to_string(), Box::new(|| Box::new(IntegerDivision)));
    map.insert("percentage".to_string(), Box::new(|| Box::new(Percentage)));
    map.insert(
        "absdiff".to_string(),
        Box::new(|| Box::new(AbsoluteDifference)),
    );
    map
}

/// Factory over the process-wide operation registry.
pub struct OperationFactory;

impl OperationFactory {
    /// Resolve an operation by name, case-insensitively.
    pub fn create(name: &str) -> CalcResult<Box<dyn Operation>> {
        let key = name.trim().to_lowercase();
        let registry = REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        match registry.get(&key) {
            Some(ctor) => Ok(ctor()),
            None => Err(CalcError::UnknownOperation(name.trim().to_string())),
        }
    }

    /// Register (or overwrite) an operation constructor under a name.
    pub fn register(
        name: &str,
        ctor: impl Fn() -> Box<dyn Operation> + Send + Sync + 'static,
    ) {
        let mut registry = REGISTRY
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registry.insert(name.trim().to_lowercase(), Box::new(ctor));
    }

    /// Names currently registered, sorted for stable display.
    pub fn registered_names() -> Vec<String> {
        let registry = REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = registry.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_create_all_builtin_operations() {
        let expected = [
            ("add", "Addition"),
            ("subtract", "Subtraction"),
            ("multiply", "Multiplication"),
            ("divide", "Division"),
            ("power", "Power"),
            ("root", "Root"),
            ("modulus", "Modulus"),
            ("intdiv", "IntegerDivision"),
            ("percentage", "Percentage"),
            ("absdiff", "AbsoluteDifference"),
        ];
        for (command, display) in expected {
            let op = OperationFactory::create(command).unwrap();
            assert_eq!(op.name(), display);
        }
    }

    #[test]
    fn test_create_is_case_insensitive() {
        assert_eq!(OperationFactory::create("ADD").unwrap().name(), "Addition");
        assert_eq!(OperationFactory::create("  Root ").unwrap().name(), "Root");
    }

    #[test]
    fn test_create_unknown_operation() {
        let err = OperationFactory::create("invalid_op").unwrap_err();
        assert_eq!(err.to_string(), "Unknown operation: invalid_op");
        assert!(matches!(err, CalcError::UnknownOperation(_)));
    }

    #[test]
    fn test_register_custom_operation() {
        #[derive(Debug)]
        struct FirstOperand;

        impl Operation for FirstOperand {
            fn execute(&self, a: Decimal, _b: Decimal) -> CalcResult<Decimal> {
                Ok(a)
            }

            fn name(&self) -> &'static str {
                "FirstOperand"
            }
        }

        OperationFactory::register("first_operand_test", || Box::new(FirstOperand));
        let op = OperationFactory::create("first_operand_test").unwrap();
        assert_eq!(op.name(), "FirstOperand");
        assert_eq!(
            op.execute("7".parse().unwrap(), "9".parse().unwrap()).unwrap(),
            "7".parse::<Decimal>().unwrap()
        );

        // Re-registration simply overwrites.
        OperationFactory::register("first_operand_test", || Box::new(FirstOperand));
        assert!(OperationFactory::create("first_operand_test").is_ok());
    }

    #[test]
    fn test_registered_names_includes_builtins() {
        let names = OperationFactory::registered_names();
        for builtin in ["add", "divide", "absdiff"] {
            assert!(names.iter().any(|n| n == builtin), "missing {builtin}");
        }
    }
}
