//! Interactive read-eval-print loop over the calculation engine.
//!
//! This layer only prompts, parses command words, and formats output; every
//! engine call can fail with a typed error that is printed and never fatal.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::calculation::OperationKind;
use crate::engine::Calculator;
use crate::operations::OperationFactory;

pub struct Repl {
    calculator: Calculator,
    editor: DefaultEditor,
    running: bool,
}

impl Repl {
    pub fn new(calculator: Calculator) -> anyhow::Result<Self> {
        Ok(Self {
            calculator,
            editor: DefaultEditor::new()?,
            running: true,
        })
    }

    /// Run until `exit` or end of input. The history is saved on the way
    /// out; a failed save is reported but does not change the exit path.
    pub fn run(&mut self) -> anyhow::Result<()> {
        println!("Advanced calculator with persistent undo/redo history.");
        println!("Type 'help' for available commands, 'exit' to quit.\n");

        while self.running {
            match self.editor.readline("calc> ") {
                Ok(line) => {
                    self.editor.add_history_entry(line.as_str()).ok();
                    self.dispatch(line.trim());
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Cancelled");
                }
                Err(ReadlineError::Eof) => {
                    self.handle_exit();
                }
                Err(err) => {
                    eprintln!("Input error: {err}");
                    self.running = false;
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, command: &str) {
        let command = command.to_lowercase();
        match command.as_str() {
            "" => {}
            "help" => println!("{}", help_text()),
            "exit" => self.handle_exit(),
            "history" => self.show_history(),
            "clear" => {
                self.calculator.clear_history();
                println!("History cleared");
            }
            "undo" => {
                if self.calculator.undo() {
                    println!("Operation undone");
                } else {
                    println!("Nothing to undo");
                }
            }
            "redo" => {
                if self.calculator.redo() {
                    println!("Operation redone");
                } else {
                    println!("Nothing to redo");
                }
            }
            "save" => match self.calculator.save_history() {
                Ok(()) => println!("History saved"),
                Err(e) => println!("Error saving history: {e}"),
            },
            "load" => match self.calculator.load_history() {
                Ok(()) => println!("History loaded"),
                Err(e) => println!("Error loading history: {e}"),
            },
            name if is_operation_command(name) => self.handle_operation(name),
            other => {
                println!("Unknown command: '{other}'. Type 'help' for available commands.");
            }
        }
    }

    fn handle_operation(&mut self, name: &str) {
        let (first, second) = operand_prompts(name);
        let Some(a) = self.prompt_operand(first) else {
            println!("Operation cancelled");
            return;
        };
        let Some(b) = self.prompt_operand(second) else {
            println!("Operation cancelled");
            return;
        };

        let outcome = OperationFactory::create(name).and_then(|op| {
            self.calculator.set_operation(op);
            self.calculator.perform_operation(&a, &b)
        });
        match outcome {
            Ok(result) => {
                let precision = self.calculator.config().precision;
                let formatted = result.round_dp(precision).normalize();
                if name == "percentage" {
                    println!("Result: {formatted}%");
                } else {
                    println!("Result: {formatted}");
                }
            }
            Err(e) => println!("Error: {e}"),
        }
    }

    /// Prompt for one operand; `cancel` (or end of input) aborts.
    fn prompt_operand(&mut self, label: &str) -> Option<String> {
        match self.editor.readline(&format!("{label}: ")) {
            Ok(line) => {
                let trimmed = line.trim().to_string();
                if trimmed.eq_ignore_ascii_case("cancel") {
                    None
                } else {
                    Some(trimmed)
                }
            }
            Err(_) => None,
        }
    }

    fn show_history(&self) {
        let history = self.calculator.history();
        if history.is_empty() {
            println!("No calculations in history");
            return;
        }
        for (i, record) in history.iter().enumerate() {
            println!("{:3}. {record}", i + 1);
        }
        println!("Total calculations: {}", history.len());
    }

    fn handle_exit(&mut self) {
        match self.calculator.save_history() {
            Ok(()) => println!("History saved. Goodbye!"),
            Err(e) => println!("Warning: could not save history: {e}"),
        }
        self.running = false;
    }
}

fn is_operation_command(name: &str) -> bool {
    OperationKind::ALL.iter().any(|kind| kind.command_name() == name)
}

fn operand_prompts(name: &str) -> (&'static str, &'static str) {
    match name {
        "percentage" => ("Value", "Total (base)"),
        "root" => ("Number", "Root degree (n)"),
        "power" => ("Base", "Exponent"),
        "modulus" | "intdiv" | "divide" => ("Dividend", "Divisor"),
        _ => ("First number", "Second number"),
    }
}

/// Help text assembled from plain section formatters.
fn help_text() -> String {
    [
        section("Basic operations", &[
            ("add", "Add two numbers"),
            ("subtract", "Subtract the second number from the first"),
            ("multiply", "Multiply two numbers"),
            ("divide", "Divide the first number by the second"),
        ]),
        section("Advanced operations", &[
            ("power", "Raise a base to a non-negative exponent"),
            ("root", "Take the nth root of a number"),
            ("modulus", "Remainder of dividing the first number by the second"),
            ("intdiv", "Floor division"),
            ("percentage", "First number as a percentage of the second"),
            ("absdiff", "Absolute difference of two numbers"),
        ]),
        section("History", &[
            ("history", "Show all calculations"),
            ("clear", "Clear history and undo/redo state"),
            ("undo", "Undo the last calculation"),
            ("redo", "Redo the last undone calculation"),
        ]),
        section("Files", &[
            ("save", "Save history to disk"),
            ("load", "Load history from disk"),
        ]),
        section("General", &[
            ("help", "Show this menu"),
            ("exit", "Save history and leave"),
        ]),
    ]
    .join("\n")
}

fn section(title: &str, entries: &[(&str, &str)]) -> String {
    let mut out = format!("{title}:\n");
    for (command, description) in entries {
        out.push_str(&format!("  {command:<12} {description}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_commands_recognized() {
        for kind in OperationKind::ALL {
            assert!(is_operation_command(kind.command_name()));
        }
        assert!(!is_operation_command("history"));
        assert!(!is_operation_command("bogus"));
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for kind in OperationKind::ALL {
            assert!(help.contains(kind.command_name()), "help misses {kind}");
        }
        for command in ["history", "clear", "undo", "redo", "save", "load", "exit"] {
            assert!(help.contains(command), "help misses {command}");
        }
        // No aliases outside the documented command set.
        assert!(!help.contains("quit"));
    }
}
