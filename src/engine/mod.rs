//! The calculation engine: bound operation strategy, history, undo/redo
//! stacks, and observer notification.
//!
//! The engine is single-threaded and synchronous. Every mutation in
//! `perform_operation` happens only after the computation has succeeded, so
//! no partial state is ever visible on failure; callers embedding the engine
//! in a concurrent context must serialize access externally.

mod memento;
mod observer;

pub use memento::HistoryMemento;
pub use observer::{HistoryObserver, LoggingObserver};

use std::cell::RefCell;
use std::rc::Rc;

use rust_decimal::Decimal;

use crate::calculation::{parse_decimal, Calculation, OperationKind};
use crate::config::CalculatorConfig;
use crate::error::{CalcError, CalcResult};
use crate::operations::Operation;
use crate::persistence::HistoryStore;

/// Shared handle to a registered observer. Removal is by handle identity.
pub type SharedObserver = Rc<RefCell<dyn HistoryObserver>>;

/// Calculator engine owning the history state machine.
pub struct Calculator {
    operation_strategy: Option<Box<dyn Operation>>,
    history: Vec<Calculation>,
    undo_stack: Vec<HistoryMemento>,
    redo_stack: Vec<HistoryMemento>,
    observers: Vec<SharedObserver>,
    store: HistoryStore,
    config: CalculatorConfig,
}

impl Calculator {
    /// Create an engine with empty history and stacks.
    pub fn new(config: CalculatorConfig) -> Self {
        let store = HistoryStore::new(config.history_file());
        tracing::info!("Calculator initialized with configuration: {config:?}");
        Self {
            operation_strategy: None,
            history: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            observers: Vec::new(),
            store,
            config,
        }
    }

    /// Bind the operation strategy used by subsequent `perform_operation`
    /// calls. No validation happens here.
    pub fn set_operation(&mut self, operation: Box<dyn Operation>) {
        tracing::info!("Set operation: {}", operation.name());
        self.operation_strategy = Some(operation);
    }

    /// Parse the raw operands, execute the bound operation, and record the
    /// result.
    ///
    /// On success the pre-mutation history is pushed onto the undo stack,
    /// the redo stack is cleared, the new record is appended (evicting the
    /// oldest when over the configured maximum), and observers are notified
    /// in registration order.
    pub fn perform_operation(&mut self, a_raw: &str, b_raw: &str) -> CalcResult<Decimal> {
        let strategy = self
            .operation_strategy
            .as_ref()
            .ok_or_else(|| CalcError::operation("No operation set"))?;
        let a = parse_decimal(a_raw).inspect_err(|e| {
            tracing::error!("Validation error in perform_operation: {e}");
        })?;
        let b = parse_decimal(b_raw).inspect_err(|e| {
            tracing::error!("Validation error in perform_operation: {e}");
        })?;
        let result = strategy.execute(a, b).inspect_err(|e| {
            tracing::error!("Validation error in perform_operation: {e}");
        })?;
        let kind: OperationKind = strategy.name().parse()?;

        // State is touched only after the computation has fully succeeded.
        self.undo_stack.push(HistoryMemento::capture(&self.history));
        self.redo_stack.clear();
        self.history.push(Calculation::from_result(kind, a, b, result));
        while self.history.len() > self.config.max_history_size {
            self.history.remove(0);
        }

        if let Some(record) = self.history.last() {
            tracing::info!("Performed operation: {record}");
            for observer in &self.observers {
                observer.borrow_mut().on_calculation(record);
            }
        }

        if self.config.auto_save {
            if let Err(e) = self.save_history() {
                tracing::warn!("Auto-save after calculation failed: {e}");
            }
        }

        Ok(result)
    }

    /// Restore the most recent prior history state. Returns `false` (no-op)
    /// when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(memento) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(HistoryMemento::capture(&self.history));
        self.history = memento.into_history();
        tracing::info!("Undo: history restored to {} records", self.history.len());
        true
    }

    /// Mirror of [`Calculator::undo`] over the redo stack.
    pub fn redo(&mut self) -> bool {
        let Some(memento) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(HistoryMemento::capture(&self.history));
        self.history = memento.into_history();
        tracing::info!("Redo: history restored to {} records", self.history.len());
        true
    }

    /// Empty the history and both stacks unconditionally.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
        tracing::info!("History cleared");
    }

    /// Read-only view of the history, in chronological order.
    pub fn history(&self) -> &[Calculation] {
        &self.history
    }

    /// The configuration this engine was constructed with.
    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Subscribe an observer; it is notified after each successful
    /// calculation until removed.
    pub fn add_observer(&mut self, observer: SharedObserver) {
        self.observers.push(observer);
    }

    /// Unsubscribe by handle identity. Unknown handles are ignored.
    pub fn remove_observer(&mut self, observer: &SharedObserver) {
        self.observers
            .retain(|existing| !Rc::ptr_eq(existing, observer));
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Persist the current history through the store.
    pub fn save_history(&self) -> CalcResult<()> {
        self.store.save(&self.history)
    }

    /// Replace the live history with the persisted one. The undo and redo
    /// stacks are left untouched, so a load remains undoable.
    pub fn load_history(&mut self) -> CalcResult<()> {
        self.history = self.store.load()?;
        tracing::info!("Loaded {} records from history file", self.history.len());
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[cfg(test)]
    pub(crate) fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}
