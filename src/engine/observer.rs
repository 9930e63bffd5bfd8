//! Observer registration for new calculations.

use crate::calculation::Calculation;

/// Notified synchronously, in registration order, after each successful
/// calculation. Undo, redo, and clear do not notify.
pub trait HistoryObserver {
    fn on_calculation(&mut self, calculation: &Calculation);
}

/// Logs every new calculation at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl HistoryObserver for LoggingObserver {
    fn on_calculation(&mut self, calculation: &Calculation) {
        tracing::info!("Calculation performed: {calculation}");
    }
}
