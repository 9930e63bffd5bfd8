//! Main entry point for the RustyCalc application.
//!
//! Loads configuration from the environment, initializes file logging, wires
//! the history engine with its logging observer, restores any saved history,
//! and hands control to the interactive loop.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};

use rusty_calc::config::CalculatorConfig;
use rusty_calc::engine::{Calculator, LoggingObserver};
use rusty_calc::logger;
use rusty_calc::repl::Repl;

fn main() -> Result<()> {
    let config = CalculatorConfig::from_env().context("Invalid calculator configuration")?;

    // Initialize logging before anything else
    logger::init_logging(&config.log_dir());

    let mut calculator = Calculator::new(config);
    calculator.add_observer(Rc::new(RefCell::new(LoggingObserver)));

    // A corrupt history file should not block startup
    if let Err(e) = calculator.load_history() {
        tracing::warn!("Could not load saved history: {e}");
        eprintln!("Warning: could not load saved history: {e}");
    }

    Repl::new(calculator)?.run()
}
