//! RustyCalc - an interactive decimal calculator with persistent history
//!
//! This library provides the core functionality for RustyCalc, including:
//! - Ten arithmetic operations over arbitrary-precision decimals
//! - A factory for resolving operations by name, open to custom registrations
//! - A history engine with memento-based undo/redo and observer hooks
//! - CSV persistence for calculation history
//!
//! # Example
//!
//! ```no_run
//! use rusty_calc::config::CalculatorConfig;
//! use rusty_calc::engine::Calculator;
//! use rusty_calc::operations::OperationFactory;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut calculator = Calculator::new(CalculatorConfig::default());
//!
//!     calculator.set_operation(OperationFactory::create("add")?);
//!     let sum = calculator.perform_operation("2", "3")?;
//!     assert_eq!(sum.to_string(), "5");
//!
//!     calculator.undo();
//!     assert!(calculator.history().is_empty());
//!     Ok(())
//! }
//! ```

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod logger;
pub mod operations;
pub mod persistence;
pub mod repl;

// Re-export commonly used types
pub use calculation::{Calculation, OperationKind};
pub use config::CalculatorConfig;
pub use engine::{Calculator, HistoryMemento, HistoryObserver, LoggingObserver, SharedObserver};
pub use error::{CalcError, CalcResult};
pub use operations::{Operation, OperationFactory};
pub use persistence::HistoryStore;
pub use repl::Repl;
