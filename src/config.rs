//! Runtime configuration for the calculator.
//!
//! Read once at startup from `CALCULATOR_*` environment variables with sane
//! defaults; the engine only ever sees the resulting struct.

use std::env;
use std::path::PathBuf;

use crate::error::{CalcError, CalcResult};

/// Configuration consumed by the engine and the binary.
#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    /// Directory holding the `history/` and `logs/` subdirectories.
    pub base_dir: PathBuf,
    /// Maximum number of retained calculation records; oldest are evicted.
    pub max_history_size: usize,
    /// Display precision (decimal places) for REPL result formatting.
    pub precision: u32,
    /// Save the history file after every successful calculation.
    pub auto_save: bool,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            max_history_size: 1000,
            precision: 10,
            auto_save: true,
        }
    }
}

impl CalculatorConfig {
    /// Build a configuration from the environment, falling back to defaults.
    pub fn from_env() -> CalcResult<Self> {
        let mut config = Self::default();
        if let Some(dir) = env::var_os("CALCULATOR_BASE_DIR") {
            config.base_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = env::var("CALCULATOR_MAX_HISTORY_SIZE") {
            config.max_history_size = raw.parse().map_err(|_| {
                CalcError::operation(format!("Invalid CALCULATOR_MAX_HISTORY_SIZE: '{raw}'"))
            })?;
        }
        if let Ok(raw) = env::var("CALCULATOR_PRECISION") {
            config.precision = raw.parse().map_err(|_| {
                CalcError::operation(format!("Invalid CALCULATOR_PRECISION: '{raw}'"))
            })?;
        }
        if let Ok(raw) = env::var("CALCULATOR_AUTO_SAVE") {
            config.auto_save = match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(CalcError::operation(format!(
                        "Invalid CALCULATOR_AUTO_SAVE: '{raw}'"
                    )));
                }
            };
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> CalcResult<()> {
        if self.max_history_size == 0 {
            return Err(CalcError::operation("max_history_size must be positive"));
        }
        Ok(())
    }

    /// Path of the persisted history file.
    pub fn history_file(&self) -> PathBuf {
        self.base_dir.join("history").join("calculator_history.csv")
    }

    /// Directory that log files are written to.
    pub fn log_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }
}

fn default_base_dir() -> PathBuf {
    // Simple, cross-platform default: ~/.rusty-calc
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rusty-calc")
}
